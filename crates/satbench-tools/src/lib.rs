//! satbench の各バイナリが共有する部品
//!
//! - [`common::io`]: gzip 対応の入出力
//! - [`common::csv`]: CSV 行の書き出し
//! - [`config`]: 共通オプション（CLI + TOML）と結果表の読み込み
//! - [`report`]: JSON レポートと警告のサマリ

pub mod common;
pub mod config;
pub mod report;
