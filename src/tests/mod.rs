// Test modules for all components
pub mod support;
pub mod test_config;
pub mod test_learner;
