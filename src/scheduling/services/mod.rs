//! Orchestration services for instance generation.

mod generator;

pub use generator::{
    GenerationReport, GeneratorConfig, GeneratorError, GeneratorResult, InstanceGenerator,
};
