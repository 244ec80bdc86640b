pub mod cpu_region_redactor;
mod gaussian;
