pub mod font;
pub mod measure;
pub mod wrap;

#[cfg(test)]
#[path = "../tests/unit/support/fixed_measurer.rs"]
pub(crate) mod fixed_measurer;
