//! Run artifacts: a JSON dump and a static HTML page of one batch.

use crate::types::Record;
use chrono::{DateTime, Utc};
use html_escape::{encode_double_quoted_attribute, encode_text};
use std::fs;
use std::path::Path;

const PLACEHOLDER_IMAGE: &str =
    "https://via.placeholder.com/300x300/f0f0f0/999999?text=No+Image";
const MAX_NAME_CHARS: usize = 100;

/// Pretty-printed JSON array of `records`.
pub fn write_json(path: &Path, records: &[Record]) -> crate::Result<()> {
    let json = serde_json::to_string_pretty(records)?;
    fs::write(path, json)?;
    tracing::info!(path = %path.display(), records = records.len(), "wrote json");
    Ok(())
}

pub fn write_html(
    path: &Path,
    records: &[Record],
    title: &str,
    generated_at: DateTime<Utc>,
) -> crate::Result<()> {
    fs::write(path, render_html(records, title, generated_at))?;
    tracing::info!(path = %path.display(), records = records.len(), "wrote html");
    Ok(())
}

/// Self-contained responsive page with one card per record.
pub fn render_html(records: &[Record], title: &str, generated_at: DateTime<Utc>) -> String {
    let cards = records
        .iter()
        .map(render_card)
        .collect::<Vec<_>>()
        .join("\n");
    let title = encode_text(title);

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <script src="https://cdn.tailwindcss.com"></script>
    <style>
        .product-card {{ transition: transform 0.3s ease, box-shadow 0.3s ease; }}
        .product-card:hover {{ transform: translateY(-5px); box-shadow: 0 10px 25px rgba(0, 0, 0, 0.1); }}
        .product-image {{ aspect-ratio: 1; object-fit: cover; }}
    </style>
</head>
<body class="bg-gray-50 min-h-screen">
    <div class="container mx-auto px-4 py-8">
        <header class="text-center mb-12">
            <h1 class="text-4xl font-bold text-gray-800 mb-4">{title}</h1>
            <p class="text-gray-600 text-lg">Generated on {generated}</p>
            <p class="text-gray-500 text-sm mt-2">Found {count} products</p>
        </header>
        <div class="grid grid-cols-1 sm:grid-cols-2 md:grid-cols-3 lg:grid-cols-4 xl:grid-cols-5 gap-6">
{cards}
        </div>
    </div>
</body>
</html>
"#,
        generated = generated_at.format("%B %d, %Y at %I:%M %p"),
        count = records.len(),
    )
}

fn render_card(record: &Record) -> String {
    let image = if record.image_url().is_empty() {
        PLACEHOLDER_IMAGE
    } else {
        record.image_url()
    };
    let link_attrs = if record.link().is_empty() {
        r##"href="#" style="pointer-events: none; opacity: 0.5;""##.to_string()
    } else {
        format!(
            r#"href="{}" target="_blank" rel="noopener""#,
            encode_double_quoted_attribute(record.link())
        )
    };

    format!(
        r#"            <div class="product-card bg-white rounded-lg shadow-md overflow-hidden">
                <div class="aspect-square bg-gray-100 flex items-center justify-center">
                    <img src="{image}" alt="{alt}" class="product-image w-full h-full object-contain" onerror="this.src='{placeholder}'">
                </div>
                <div class="p-4">
                    <h3 class="font-semibold text-sm text-gray-800 mb-2 line-clamp-2 h-10 overflow-hidden">{name}</h3>
                    <p class="text-lg font-bold text-green-600 mb-3">{price}</p>
                    <a {link_attrs} class="block w-full bg-blue-600 hover:bg-blue-700 text-white text-center py-2 px-4 rounded-md text-sm font-medium">View Product</a>
                </div>
            </div>"#,
        image = encode_double_quoted_attribute(image),
        alt = encode_double_quoted_attribute(record.name()),
        placeholder = PLACEHOLDER_IMAGE,
        name = encode_text(&truncate_name(record.name())),
        price = encode_text(record.price()),
    )
}

fn truncate_name(name: &str) -> String {
    if name.chars().count() > MAX_NAME_CHARS {
        let head: String = name.chars().take(MAX_NAME_CHARS).collect();
        format!("{}...", head)
    } else {
        name.to_string()
    }
}
