mod codec_tests;
mod config_tests;
mod rs256_tests;
