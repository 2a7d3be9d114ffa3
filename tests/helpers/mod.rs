pub mod project_helpers;
pub mod source_fixtures;
