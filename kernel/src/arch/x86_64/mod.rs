pub mod boot;
pub mod cpu;
