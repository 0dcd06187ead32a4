pub mod simulated_classifier;
