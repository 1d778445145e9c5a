mod engine_integration;
