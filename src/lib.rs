//! 設定ファイルに記述されたパッケージインポートを、
//! 実際のコピーを行うCIパイプライン設定に変換する。

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod generator;
pub mod output;
pub mod packages;
pub mod pipeline;
pub mod registry;
