pub mod dataset;
pub mod executable_utils;
pub mod generator;
pub mod mocks;
pub mod model;
pub mod normalize;
