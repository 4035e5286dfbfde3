// Debugging helpers not wired into the panic path.

/// Stack unwinding without frame-pointer metadata is out of scope.
pub fn print_stack_trace() {
    crate::error!("stack trace printing not implemented");
}

/// No symbol table is loaded at boot, so addresses stay opaque.
pub fn resolve_symbol(_addr: u64) -> &'static str {
    "<symbol resolution not implemented>"
}

pub fn print_cpu_state() {
    crate::error!("CPU state dump not implemented");
}
