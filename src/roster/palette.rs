// ABOUTME: Color and emoji palette handed out to new roster members in round-robin order
// ABOUTME: Also derives a display role from an email address when none is given
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use squad_core::models::MemberId;

/// Accent color, background color and emoji for one palette slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteEntry {
    /// Accent color
    pub color: &'static str,
    /// Card background
    pub bg: &'static str,
    /// Avatar emoji
    pub emoji: &'static str,
}

const fn entry(color: &'static str, bg: &'static str, emoji: &'static str) -> PaletteEntry {
    PaletteEntry { color, bg, emoji }
}

/// Palette slots, assigned by member id
pub const PALETTE: [PaletteEntry; 12] = [
    entry("#7c3aed", "#ede9fe", "🦁"),
    entry("#db2777", "#fce7f3", "🐯"),
    entry("#0284c7", "#e0f2fe", "🦊"),
    entry("#b45309", "#fef3c7", "🐺"),
    entry("#059669", "#d1fae5", "🦅"),
    entry("#0e7490", "#cffafe", "🐬"),
    entry("#be185d", "#fdf2f8", "🦋"),
    entry("#d97706", "#fffbeb", "🐉"),
    entry("#4f46e5", "#eef2ff", "🦄"),
    entry("#0891b2", "#ecfeff", "🐋"),
    entry("#16a34a", "#f0fdf4", "🦎"),
    entry("#dc2626", "#fef2f2", "🦁"),
];

/// Palette slot for a member id (ids start at 1)
#[must_use]
pub fn palette_for(id: MemberId) -> PaletteEntry {
    let index = (id.saturating_sub(1) as usize) % PALETTE.len();
    PALETTE[index]
}

/// Role derived from an email: local part, dots as spaces, title-cased
///
/// `jane.doe@example.com` becomes `Jane Doe`.
#[must_use]
pub fn default_role(email: &str) -> String {
    let local = email.split('@').next().unwrap_or_default().replace('.', " ");
    let mut role = String::with_capacity(local.len());
    let mut at_word_start = true;
    for ch in local.chars() {
        if ch.is_alphabetic() {
            if at_word_start {
                role.extend(ch.to_uppercase());
            } else {
                role.extend(ch.to_lowercase());
            }
            at_word_start = false;
        } else {
            role.push(ch);
            at_word_start = true;
        }
    }
    role
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_wraps_after_twelve() {
        assert_eq!(palette_for(1).color, "#7c3aed");
        assert_eq!(palette_for(12).color, "#dc2626");
        assert_eq!(palette_for(13), palette_for(1));
        assert_eq!(palette_for(0), palette_for(1));
    }

    #[test]
    fn test_default_role_from_email() {
        assert_eq!(default_role("jane.doe@example.com"), "Jane Doe");
        assert_eq!(default_role("MARK@example.com"), "Mark");
        assert_eq!(default_role("ana_lopez2x@example.com"), "Ana_Lopez2X");
    }
}
