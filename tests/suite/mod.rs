mod config;
mod keyboard;
mod scenarios;
