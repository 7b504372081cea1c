//! Shared UI icons and emojis.
//!
//! Each icon has a plain-ASCII fallback that `console` picks when the
//! terminal cannot render the emoji.

use console::Emoji;

// Status indicators
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK]");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "[ERR]");
pub static SPARKLE: Emoji<'_, '_> = Emoji("✨ ", "*");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "[!]");

// Files
pub static FILE_NEW: Emoji<'_, '_> = Emoji("📄 ", "+");
pub static UPLOAD: Emoji<'_, '_> = Emoji("📎 ", "[FILE]");
pub static CLIPBOARD: Emoji<'_, '_> = Emoji("📋 ", "[COPY]");

// Session
pub static HISTORY: Emoji<'_, '_> = Emoji("🕘 ", "[H]");
pub static COOKIE: Emoji<'_, '_> = Emoji("🍪 ", "[C]");
pub static AD: Emoji<'_, '_> = Emoji("📢 ", "[AD]");
