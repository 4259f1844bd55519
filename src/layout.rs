pub(crate) mod directives;
pub(crate) mod engine;
pub(crate) mod metrics;
