pub mod episode_record;
pub mod run_config;
