//! ターミナル出力（stderr）

use owo_colors::OwoColorize;
use std::fmt::Display;

/// 情報メッセージ
pub fn info(message: &str) {
    eprintln!("{} {}", "ℹ".blue(), message);
}

/// 成功メッセージ
pub fn success(message: &str) {
    eprintln!("{} {}", "✓".green(), message);
}

/// エラーメッセージ（文脈 + エラー本文）
pub fn format_error(message: &str, err: &impl Display) -> String {
    format!("{} {}\n  {}", "✗".red(), message, err)
}
