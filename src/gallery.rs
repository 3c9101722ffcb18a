use chrono::{DateTime, Utc};

/// One card in the rendered gallery. Hrefs are pre-resolved by the
/// caller: local relative paths in download mode, source URLs in
/// remote mode.
#[derive(Debug, Clone)]
pub struct GalleryEntry {
    pub title: String,
    pub pdf_href: String,
    pub thumb_href: Option<String>,
    pub video_url: Option<String>,
}

const PAGE_HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Step-by-Step Guides</title>
    <style>
        * { margin: 0; padding: 0; box-sizing: border-box; }
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Oxygen, Ubuntu, Cantarell, sans-serif;
            background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
            padding: 20px;
            min-height: 100vh;
        }
        .container { max-width: 1400px; margin: 0 auto; }
        h1 {
            color: white;
            text-align: center;
            margin-bottom: 30px;
            font-size: 2.5em;
            text-shadow: 2px 2px 4px rgba(0,0,0,0.3);
        }
        .stats {
            background: white;
            padding: 15px;
            border-radius: 10px;
            margin-bottom: 30px;
            text-align: center;
            box-shadow: 0 4px 6px rgba(0,0,0,0.1);
            display: flex;
            justify-content: space-between;
            align-items: center;
            flex-wrap: wrap;
            gap: 15px;
        }
        .random-button {
            padding: 12px 24px;
            background: linear-gradient(135deg, #f093fb 0%, #f5576c 100%);
            color: white;
            border: none;
            border-radius: 8px;
            font-size: 1em;
            font-weight: 600;
            cursor: pointer;
            transition: transform 0.2s ease, box-shadow 0.2s ease;
            box-shadow: 0 2px 4px rgba(0,0,0,0.2);
        }
        .random-button:hover {
            transform: translateY(-2px);
            box-shadow: 0 4px 8px rgba(0,0,0,0.3);
        }
        .random-button:active { transform: translateY(0); }
        .gallery {
            display: grid;
            grid-template-columns: repeat(auto-fill, minmax(280px, 1fr));
            gap: 25px;
            margin-top: 20px;
        }
        .card {
            background: white;
            border-radius: 12px;
            overflow: hidden;
            box-shadow: 0 4px 6px rgba(0,0,0,0.1);
            transition: transform 0.3s ease, box-shadow 0.3s ease;
            display: flex;
            flex-direction: column;
        }
        .card:hover {
            transform: translateY(-5px);
            box-shadow: 0 8px 15px rgba(0,0,0,0.2);
        }
        .thumbnail {
            width: 100%;
            height: 200px;
            object-fit: cover;
            background: #f0f0f0;
            display: flex;
            align-items: center;
            justify-content: center;
            color: #999;
            font-size: 14px;
        }
        .no-thumbnail {
            background: linear-gradient(135deg, #f093fb 0%, #f5576c 100%);
            color: white;
            font-weight: 500;
        }
        .card-content {
            padding: 15px;
            flex-grow: 1;
            display: flex;
            flex-direction: column;
        }
        .card-title {
            font-size: 1.1em;
            font-weight: 600;
            color: #333;
            margin-bottom: 10px;
            line-height: 1.4;
        }
        .card-actions {
            margin-top: auto;
            display: flex;
            flex-direction: column;
            gap: 8px;
        }
        .card-link {
            display: inline-block;
            padding: 10px 20px;
            background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
            color: white;
            text-decoration: none;
            border-radius: 6px;
            text-align: center;
            font-weight: 500;
            transition: opacity 0.3s ease;
        }
        .card-link:hover { opacity: 0.9; }
        .video-link { background: linear-gradient(135deg, #f093fb 0%, #f5576c 100%); }
        .footer {
            color: rgba(255,255,255,0.8);
            text-align: center;
            margin-top: 30px;
            font-size: 0.9em;
        }
        @media (max-width: 768px) {
            .stats { flex-direction: column; }
            .gallery { grid-template-columns: repeat(auto-fill, minmax(200px, 1fr)); gap: 15px; }
            h1 { font-size: 2em; }
        }
    </style>
</head>
<body>
    <div class="container">
        <h1>&#128218; Step-by-Step Guides</h1>
"#;

const PAGE_SCRIPT: &str = r#"    <script>
        const pdfLinks = [];
        document.querySelectorAll('.card-link:not(.video-link)').forEach(link => {
            pdfLinks.push(link.href);
        });

        function openRandomGuide() {
            if (pdfLinks.length === 0) {
                alert('No guides available');
                return;
            }
            const randomIndex = Math.floor(Math.random() * pdfLinks.length);
            window.open(pdfLinks[randomIndex], '_blank');
        }
    </script>
</body>
</html>
"#;

/// Render the full gallery page: stats bar, card grid, random-guide
/// button, generation footer.
pub fn render(entries: &[GalleryEntry], generated_at: DateTime<Utc>) -> String {
    let mut html = String::with_capacity(PAGE_HEAD.len() + entries.len() * 512);
    html.push_str(PAGE_HEAD);

    html.push_str(&format!(
        "        <div class=\"stats\">\n            <div><strong>Total Guides:</strong> {}</div>\n            <button class=\"random-button\" onclick=\"openRandomGuide()\">&#127922; Random Guide</button>\n        </div>\n        <div class=\"gallery\">\n",
        entries.len()
    ));

    for entry in entries {
        html.push_str(&render_card(entry));
    }

    html.push_str("        </div>\n");
    html.push_str(&format!(
        "        <div class=\"footer\">Generated {}</div>\n    </div>\n",
        generated_at.format("%Y-%m-%d %H:%M UTC")
    ));
    html.push_str(PAGE_SCRIPT);
    html
}

fn render_card(entry: &GalleryEntry) -> String {
    let title = escape_html(&entry.title);
    let thumbnail = match &entry.thumb_href {
        Some(href) => format!(
            "<img src=\"{}\" alt=\"{}\" class=\"thumbnail\">",
            escape_html(href),
            title
        ),
        None => "<div class=\"thumbnail no-thumbnail\">&#128196; PDF</div>".to_string(),
    };
    let video = match &entry.video_url {
        Some(url) => format!(
            "\n                    <a href=\"{}\" class=\"card-link video-link\" target=\"_blank\">&#9654; Watch Video</a>",
            escape_html(url)
        ),
        None => String::new(),
    };

    format!(
        "            <div class=\"card\">\n                {}\n                <div class=\"card-content\">\n                    <div class=\"card-title\">{}</div>\n                    <div class=\"card-actions\">\n                    <a href=\"{}\" class=\"card-link\" target=\"_blank\">View PDF &#8594;</a>{}\n                    </div>\n                </div>\n            </div>\n",
        thumbnail,
        title,
        escape_html(&entry.pdf_href),
        video
    )
}

/// Minimal HTML entity escaping for text and attribute values.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

// ── Tests ──
