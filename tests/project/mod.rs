pub mod tests_loading;
