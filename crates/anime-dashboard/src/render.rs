//! Plain-text rendering of view outcomes for the terminal front end.

use anime_dashboard::analysis::{HistogramBin, PopularityPoint, Summary, TypeShare};
use anime_dashboard::compare::{ComparisonPair, Side};
use anime_dashboard::views::{SearchReport, TopReport};
use anime_dashboard::ResultSet;
use shared::SuggestionEntry;

const TITLE_WIDTH: usize = 40;
const BAR_WIDTH: usize = 30;

/// 1234567 -> "1,234,567"
fn thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(3)).collect();
    cut.push_str("...");
    cut
}

fn heading(text: &str) {
    println!();
    println!("=== {} ===", text);
}

fn print_rows(rows: &ResultSet) {
    println!("Fetched {}", rows.fetched_at().format("%Y-%m-%d %H:%M:%S UTC"));
    println!(
        "{:<width$}  {:>5}  {:<8}  {:>4}  {:>10}  {:<18}",
        "Title",
        "Score",
        "Type",
        "Eps",
        "Members",
        "Status",
        width = TITLE_WIDTH
    );
    for row in rows {
        println!(
            "{:<width$}  {:>5.2}  {:<8}  {:>4}  {:>10}  {:<18}",
            truncate(&row.title, TITLE_WIDTH),
            row.score,
            row.anime_type,
            row.episodes_or_zero(),
            thousands(row.members),
            row.status,
            width = TITLE_WIDTH
        );
    }
}

fn print_histogram(histogram: &[HistogramBin]) {
    let peak = histogram.iter().map(|b| b.count).max().unwrap_or(0).max(1);
    for bin in histogram.iter().filter(|b| b.count > 0) {
        let bar = "#".repeat((bin.count * BAR_WIDTH).div_ceil(peak));
        println!(
            "{:>5.2}-{:<5.2} {:<width$} {}",
            bin.lower,
            bin.upper,
            bar,
            bin.count,
            width = BAR_WIDTH
        );
    }
}

fn print_types(types: &[TypeShare]) {
    for share in types {
        println!(
            "{:<10} {:>3}  ({:.1}%)",
            share.anime_type,
            share.count,
            share.fraction * 100.0
        );
    }
}

fn print_scatter(points: &[PopularityPoint]) {
    let mut by_members: Vec<&PopularityPoint> = points.iter().collect();
    by_members.sort_by(|a, b| b.members.cmp(&a.members));
    for point in by_members {
        let rank = point
            .rank
            .map(|r| format!("#{}", r))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<width$}  {:>12} members  score {:.2}  rank {}",
            truncate(&point.title, TITLE_WIDTH),
            thousands(point.members),
            point.score,
            rank,
            width = TITLE_WIDTH
        );
    }
}

fn print_summary(summary: &Summary) {
    println!("Average Rating:        {:.1}/10", summary.mean_score);
    println!(
        "Most Common Format:    {} ({} titles)",
        summary.modal_type, summary.modal_type_count
    );
    println!("Total Entries:         {}", summary.count);
    println!("Total Community Size:  {}", thousands(summary.total_members));
}

pub fn search(report: &SearchReport) {
    heading(&format!("Found {} anime", report.rows.len()));
    print_rows(&report.rows);

    heading("Score Distribution");
    print_histogram(&report.histogram);

    heading("Format Distribution");
    print_types(&report.types);

    heading("Search Insights");
    print_summary(&report.summary);
}

pub fn top(report: &TopReport) {
    heading(&format!("Top {} anime", report.rows.len()));
    print_rows(&report.rows);

    heading("Score Distribution");
    print_histogram(&report.histogram);

    heading("Format Distribution");
    print_types(&report.types);

    heading("Key Insights");
    print_summary(&report.summary);

    heading("Score vs Popularity");
    print_scatter(&report.scatter);
}

pub fn comparison(pair: &ComparisonPair) {
    heading("Comparison");
    let rows = pair.metric_table();
    println!(
        "{:<10}  {:<width$}  {:<width$}",
        "Metric",
        truncate(pair.title(Side::Left), TITLE_WIDTH),
        truncate(pair.title(Side::Right), TITLE_WIDTH),
        width = TITLE_WIDTH
    );
    for row in rows {
        println!(
            "{:<10}  {:<width$}  {:<width$}",
            row.metric,
            row.left,
            row.right,
            width = TITLE_WIDTH
        );
    }

    for (side, detail) in [(Side::Left, &pair.left), (Side::Right, &pair.right)] {
        heading(pair.title(side));
        if !detail.title_english.is_empty() {
            println!("English:   {}", detail.title_english);
        }
        if !detail.title_japanese.is_empty() {
            println!("Japanese:  {}", detail.title_japanese);
        }
        println!("Aired:     {}", detail.aired);
        println!("Genres:    {}", detail.genres.join(", "));
        println!("Studios:   {}", detail.studios.join(", "));
    }

    heading("Quick Insights");
    match pair.higher_rated {
        Some(Side::Left) => println!(
            "Higher Rated: {} ({:.2} vs {:.2})",
            pair.left.row.title, pair.left.row.score, pair.right.row.score
        ),
        Some(Side::Right) => println!(
            "Higher Rated: {} ({:.2} vs {:.2})",
            pair.right.row.title, pair.right.row.score, pair.left.row.score
        ),
        None => {}
    }
    if !pair.shared_genres.is_empty() {
        let genres: Vec<&str> = pair.shared_genres.iter().map(String::as_str).collect();
        println!("Shared Genres: {}", genres.join(", "));
    }
    if let Some((left, right)) = pair.time_investment {
        println!("Time Investment:");
        println!("- {}: {}", pair.left.row.title, left);
        println!("- {}: {}", pair.right.row.title, right);
    }
}

pub fn suggestions(entries: &[SuggestionEntry]) {
    if entries.is_empty() {
        println!("No matches found. Try a different search term.");
        return;
    }
    for entry in entries {
        let alt = if entry.english_title.is_empty() {
            &entry.japanese_title
        } else {
            &entry.english_title
        };
        if alt.is_empty() {
            println!("{}", entry.title);
        } else {
            println!("{} ({})", entry.title, alt);
        }
    }
}

pub fn message(text: &str) {
    println!("{}", text);
}
