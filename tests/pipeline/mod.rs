pub mod tests_imports;
pub mod tests_scoping;
pub mod tests_vars;
