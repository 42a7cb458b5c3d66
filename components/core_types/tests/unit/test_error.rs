//! Unit tests for BindingError, JsException and ErrorKind

use core_types::{BindingError, ErrorKind, JsException, LimitKind};

#[cfg(test)]
mod error_kind_tests {
    use super::*;

    #[test]
    fn test_error_kind_known_names() {
        assert_eq!(ErrorKind::from_name("SyntaxError"), ErrorKind::SyntaxError);
        assert_eq!(ErrorKind::from_name("URIError"), ErrorKind::URIError);
        assert_eq!(ErrorKind::from_name("InternalError"), ErrorKind::InternalError);
    }

    #[test]
    fn test_error_kind_custom_name() {
        let kind = ErrorKind::from_name("HttpError");
        assert_eq!(kind.as_str(), "HttpError");
        assert_eq!(kind.to_string(), "HttpError");
    }
}

#[cfg(test)]
mod js_exception_tests {
    use super::*;

    #[test]
    fn test_js_exception_creation() {
        let error = JsException::new(ErrorKind::TypeError, "test");
        assert!(matches!(error.kind, ErrorKind::TypeError));
        assert_eq!(error.message, "test");
        assert!(error.stack.is_none());
    }

    #[test]
    fn test_js_exception_frames() {
        let error = JsException::new(ErrorKind::Error, "boom")
            .with_stack("    at inner (<input>:2:11)\n    at outer (<input>:5:3)\n");
        let frames = error.frames();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].function_name.as_deref(), Some("inner"));
        assert_eq!(frames[1].line, Some(5));
    }
}

#[cfg(test)]
mod binding_error_tests {
    use super::*;

    #[test]
    fn test_exception_accessor() {
        let error = BindingError::from(JsException::new(ErrorKind::Error, "x"));
        assert_eq!(error.exception().map(|e| e.message.as_str()), Some("x"));
        assert!(BindingError::host("no").exception().is_none());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            BindingError::conversion("symbol").to_string(),
            "type conversion failed: symbol"
        );
        assert_eq!(
            BindingError::ResourceLimitExceeded(LimitKind::Memory).to_string(),
            "memory limit exceeded"
        );
        assert_eq!(
            BindingError::Recursion("too deep".into()).to_string(),
            "stack overflow: too deep"
        );
    }

    #[test]
    fn test_errors_are_std_errors() {
        fn assert_error<E: std::error::Error + Send + Sync + 'static>(_: &E) {}
        assert_error(&BindingError::host("x"));
    }
}
