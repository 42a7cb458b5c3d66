//! Memory statistics

/// Snapshot of a runtime's allocator counters.
///
/// Sizes are in bytes. `malloc_limit` is negative or very large when no
/// memory limit is set, as reported by the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryStats {
    /// Bytes currently allocated
    pub malloc_size: i64,
    /// Configured allocation limit
    pub malloc_limit: i64,
    /// Bytes used by engine structures
    pub memory_used_size: i64,
    /// Live allocations
    pub malloc_count: i64,
    /// Interned atoms
    pub atom_count: i64,
    /// Live strings
    pub string_count: i64,
    /// Live objects
    pub object_count: i64,
    /// Live properties
    pub property_count: i64,
    /// Compiled JS functions
    pub function_count: i64,
    /// Native functions
    pub native_function_count: i64,
    /// Live arrays
    pub array_count: i64,
}

impl MemoryStats {
    pub(crate) fn read(runtime: &rquickjs::Runtime) -> Self {
        let usage = runtime.memory_usage();
        Self {
            malloc_size: usage.malloc_size,
            malloc_limit: usage.malloc_limit,
            memory_used_size: usage.memory_used_size,
            malloc_count: usage.malloc_count,
            atom_count: usage.atom_count,
            string_count: usage.str_count,
            object_count: usage.obj_count,
            property_count: usage.prop_count,
            function_count: usage.js_func_count,
            native_function_count: usage.c_func_count,
            array_count: usage.array_count,
        }
    }
}
