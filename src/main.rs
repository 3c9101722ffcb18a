mod extract;
mod fetch;
mod gallery;
mod manifest;
mod matching;
mod names;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};
use url::Url;

use extract::GuideLink;
use matching::TitleIndex;

const DEFAULT_GUIDES_URL: &str = "https://nudel.shop/pages/step-by-step";

#[derive(Parser)]
#[command(name = "guide_gallery", about = "Scrape step-by-step guide PDFs into a browsable gallery")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the page, download PDFs and thumbnails, build the gallery
    Run {
        /// Page to scrape for guide PDFs
        #[arg(long, default_value = DEFAULT_GUIDES_URL)]
        url: String,
        /// Page to scrape for instructional videos (repeatable)
        #[arg(long = "videos-page")]
        videos_pages: Vec<String>,
        /// Output directory for downloads and the gallery
        #[arg(short, long, default_value = "gallery")]
        output_dir: PathBuf,
        /// Link to remote assets instead of downloading them
        #[arg(long)]
        remote: bool,
    },
    /// List guide links found on the page without downloading
    List {
        /// Page to scrape for guide PDFs
        #[arg(long, default_value = DEFAULT_GUIDES_URL)]
        url: String,
    },
    /// Show how a title scores against the video index
    Match {
        /// Guide title to look up
        title: String,
        /// Page to scrape for instructional videos (repeatable)
        #[arg(long = "videos-page", required = true)]
        videos_pages: Vec<String>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            url,
            videos_pages,
            output_dir,
            remote,
        } => run(&url, &videos_pages, &output_dir, remote).await,
        Commands::List { url } => list(&url).await,
        Commands::Match { title, videos_pages } => match_title(&title, &videos_pages).await,
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

async fn run(url: &str, videos_pages: &[String], output_dir: &Path, remote: bool) -> Result<()> {
    let client = fetch::client()?;
    let base = Url::parse(url).context("invalid guide page URL")?;

    info!("Fetching {}", url);
    let html = fetch::fetch_page(&client, url)
        .await
        .with_context(|| format!("failed to fetch guide page {}", url))?;

    let guides = extract::guides::extract(&html, &base);
    if guides.is_empty() {
        println!("No PDF links found on the page.");
        println!("The PDFs might be loaded dynamically via JavaScript.");
        return Ok(());
    }
    println!("Found {} guide PDF(s)", guides.len());

    let index = build_video_index(&client, videos_pages).await;
    if !videos_pages.is_empty() {
        println!(
            "Indexed {} video(s) from {} page(s)",
            index.len(),
            videos_pages.len()
        );
    }

    let pdf_dir = output_dir.join("pdfs");
    let thumb_dir = output_dir.join("thumbnails");
    if remote {
        std::fs::create_dir_all(output_dir)
            .with_context(|| format!("failed to create {}", output_dir.display()))?;
    } else {
        std::fs::create_dir_all(&pdf_dir)
            .with_context(|| format!("failed to create {}", pdf_dir.display()))?;
        std::fs::create_dir_all(&thumb_dir)
            .with_context(|| format!("failed to create {}", thumb_dir.display()))?;
    }

    let mut counts = DownloadCounts::default();
    let mut processed: Vec<ProcessedGuide> = Vec::new();

    let pb = ProgressBar::new(guides.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} {msg}")?
            .progress_chars("=> "),
    );

    for guide in &guides {
        pb.set_message(truncate(&guide.title, 32));
        let result = if remote {
            Some(ProcessedGuide {
                title: guide.title.clone(),
                source_url: guide.url.clone(),
                pdf_href: guide.url.clone(),
                thumb_href: guide.thumbnail.clone(),
                file: None,
                thumbnail_file: None,
            })
        } else {
            download_guide(&client, guide, &pdf_dir, &thumb_dir, &mut counts).await
        };
        processed.extend(result);
        pb.inc(1);
    }
    pb.finish_and_clear();

    // Match titles and assemble the outputs
    let mut matched = 0usize;
    let mut entries = Vec::new();
    let mut records = Vec::new();
    for p in &processed {
        let vm = index.best_match(&p.title);
        if vm.is_some() {
            matched += 1;
        }
        entries.push(gallery::GalleryEntry {
            title: p.title.clone(),
            pdf_href: p.pdf_href.clone(),
            thumb_href: p.thumb_href.clone(),
            video_url: vm.as_ref().map(|m| m.url.clone()),
        });
        records.push(manifest::GuideRecord {
            title: p.title.clone(),
            url: p.source_url.clone(),
            file: p.file.clone(),
            thumbnail: p.thumbnail_file.clone(),
            video: vm.map(|m| manifest::MatchedVideo {
                url: m.url,
                score: m.score,
            }),
        });
    }

    let generated_at = Utc::now();
    let gallery_path = output_dir.join("gallery.html");
    std::fs::write(&gallery_path, gallery::render(&entries, generated_at))
        .with_context(|| format!("failed to write {}", gallery_path.display()))?;
    manifest::write(
        &output_dir.join("manifest.json"),
        &manifest::Manifest {
            source: url.to_string(),
            generated_at,
            guides: records,
        },
    )?;

    println!("\n{}", "=".repeat(60));
    println!("Summary:");
    if remote {
        println!("  Linked guides:         {}", entries.len());
    } else {
        counts.print();
    }
    if !index.is_empty() {
        println!("  Video matches:         {}/{}", matched, entries.len());
    }
    println!("  Gallery: {}", gallery_path.display());
    println!("{}", "=".repeat(60));

    Ok(())
}

async fn list(url: &str) -> Result<()> {
    let client = fetch::client()?;
    let base = Url::parse(url).context("invalid guide page URL")?;
    let html = fetch::fetch_page(&client, url)
        .await
        .with_context(|| format!("failed to fetch guide page {}", url))?;

    let guides = extract::guides::extract(&html, &base);
    if guides.is_empty() {
        println!("No PDF links found on the page.");
        return Ok(());
    }

    println!("{:>3} | {:<40} | {:<5} | {}", "#", "Title", "Thumb", "URL");
    println!("{}", "-".repeat(100));
    for (i, g) in guides.iter().enumerate() {
        println!(
            "{:>3} | {:<40} | {:<5} | {}",
            i + 1,
            truncate(&g.title, 40),
            if g.thumbnail.is_some() { "yes" } else { "-" },
            g.url
        );
    }
    println!("\n{} guide(s)", guides.len());
    Ok(())
}

async fn match_title(title: &str, videos_pages: &[String]) -> Result<()> {
    let client = fetch::client()?;
    let index = build_video_index(&client, videos_pages).await;
    if index.is_empty() {
        println!("No videos indexed.");
        return Ok(());
    }

    println!("Normalized: {:?}", matching::normalize(title));
    println!("\n{:>5} | {:<48} | {}", "Score", "Video", "URL");
    println!("{}", "-".repeat(100));
    for m in index.scores(title).into_iter().take(10) {
        println!("{:>5.2} | {:<48} | {}", m.score, truncate(&m.title, 48), m.url);
    }

    match index.best_match(title) {
        Some(m) => println!("\nBest match ({:.2}): {}", m.score, m.url),
        None => println!("\nNo match above threshold."),
    }
    Ok(())
}

/// Fetch each video page and fold its titled links into one index.
/// A page that fails to fetch contributes nothing.
async fn build_video_index(client: &reqwest::Client, pages: &[String]) -> TitleIndex {
    let mut index = TitleIndex::new();
    for page in pages {
        let Ok(base) = Url::parse(page) else {
            warn!("Skipping video page {}: invalid URL", page);
            continue;
        };
        match fetch::fetch_page(client, page).await {
            Ok(html) => {
                let found = extract::videos::extract(&html, &base);
                info!("Found {} video link(s) on {}", found.len(), page);
                for v in &found {
                    index.insert(&v.title, &v.url);
                }
            }
            Err(e) => warn!("Skipping video page {}: {:#}", page, e),
        }
    }
    index
}

struct ProcessedGuide {
    title: String,
    source_url: String,
    pdf_href: String,
    thumb_href: Option<String>,
    file: Option<String>,
    thumbnail_file: Option<String>,
}

#[derive(Default)]
struct DownloadCounts {
    pdfs_ok: usize,
    pdfs_skipped: usize,
    pdfs_failed: usize,
    thumbs_ok: usize,
    thumbs_failed: usize,
}

impl DownloadCounts {
    fn print(&self) {
        println!("  Downloaded PDFs:       {}", self.pdfs_ok);
        println!("  Skipped (existing):    {}", self.pdfs_skipped);
        println!("  Failed PDFs:           {}", self.pdfs_failed);
        println!("  Downloaded thumbnails: {}", self.thumbs_ok);
        println!("  Failed thumbnails:     {}", self.thumbs_failed);
    }
}

/// Download one guide PDF plus its thumbnail. A failed PDF drops the
/// guide from the gallery; a failed thumbnail only loses the image.
async fn download_guide(
    client: &reqwest::Client,
    guide: &GuideLink,
    pdf_dir: &Path,
    thumb_dir: &Path,
    counts: &mut DownloadCounts,
) -> Option<ProcessedGuide> {
    let Ok(pdf_url) = Url::parse(&guide.url) else {
        warn!("Skipping {}: unparseable URL", guide.url);
        counts.pdfs_failed += 1;
        return None;
    };
    let pdf_name = names::pdf_filename(&pdf_url);

    match fetch::download_pdf(client, &guide.url, &pdf_dir.join(&pdf_name)).await {
        Ok(fetch::Outcome::Downloaded(bytes)) => {
            counts.pdfs_ok += 1;
            info!("Downloaded {} ({} bytes)", pdf_name, bytes);
        }
        Ok(fetch::Outcome::AlreadyExists) => {
            counts.pdfs_skipped += 1;
            info!("Skipping {} (already exists)", pdf_name);
        }
        Err(e) => {
            warn!("Failed to download {}: {:#}", guide.title, e);
            counts.pdfs_failed += 1;
            return None;
        }
    }

    let mut thumb_name = None;
    if let Some(thumb_url_raw) = &guide.thumbnail {
        if let Ok(thumb_url) = Url::parse(thumb_url_raw) {
            let name = names::thumb_filename(&pdf_name, &thumb_url);
            match fetch::download_file(client, thumb_url_raw, &thumb_dir.join(&name)).await {
                Ok(_) => {
                    counts.thumbs_ok += 1;
                    thumb_name = Some(name);
                }
                Err(e) => {
                    warn!("Failed to download thumbnail for {}: {:#}", guide.title, e);
                    counts.thumbs_failed += 1;
                }
            }
        }
    }

    Some(ProcessedGuide {
        title: guide.title.clone(),
        source_url: guide.url.clone(),
        pdf_href: format!("pdfs/{}", pdf_name),
        thumb_href: thumb_name.as_ref().map(|n| format!("thumbnails/{}", n)),
        file: Some(pdf_name),
        thumbnail_file: thumb_name,
    })
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
