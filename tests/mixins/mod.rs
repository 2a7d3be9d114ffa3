pub mod tests_circular;
pub mod tests_css_mixins;
pub mod tests_merge_policy;
pub mod tests_partial_mixins;
pub mod tests_provider_mixins;
