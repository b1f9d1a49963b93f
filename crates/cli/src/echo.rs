use owo_colors::OwoColorize;
use wikifeat_core::{Article, Caption};

use crate::VERSION;

/// Print a styled banner for verbose mode
pub fn print_banner() {
    eprintln!(
        "\n{} {} {}",
        "wikifeat".bold().bright_blue(),
        "v".dimmed(),
        VERSION.dimmed()
    );
    eprintln!("{}", "Republish the featured article when it changes\n".dimmed());
}

/// Print a styled step message
pub fn print_step(step: usize, total: usize, message: &str) {
    eprintln!("{} {}", format!("[{}/{}]", step, total).dimmed(), message.bright_cyan());
}

/// Print a success message
pub fn print_success(message: &str) {
    eprintln!("{} {}", "✓".green(), message.bright_green());
}

/// Print an info message
pub fn print_info(message: &str) {
    eprintln!("{} {}", "ℹ".blue(), message.bright_blue());
}

/// Print a warning message
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow(), message.bright_yellow());
}

/// Print the located article and its caption summary
pub fn print_article_details(article: &Article, caption: &Caption) {
    eprintln!("\n{}", "═".repeat(60).dimmed());
    eprintln!("{}", "Featured Article".bold().cyan());
    eprintln!("{}", "═".repeat(60).dimmed());
    eprintln!("  {} {}", "Title:".dimmed(), article.title.bright_white());
    eprintln!("  {} {}", "Link:".dimmed(), article.link.bright_white());
    eprintln!(
        "  {} {}",
        "Paragraphs:".dimmed(),
        article.paragraphs.len().to_string().bright_white()
    );

    match &article.image {
        Some(image) => {
            let licenses: Vec<&str> = image.licenses().iter().map(String::as_str).collect();
            eprintln!("  {} {}", "Image:".dimmed(), image.source().bright_white());
            eprintln!("  {} {}", "Licenses:".dimmed(), licenses.join(", ").bright_white());
        }
        None => eprintln!("  {} {}", "Image:".dimmed(), "none".dimmed()),
    }

    eprintln!(
        "  {} {}\n",
        "Caption:".dimmed(),
        format!("{} chars", wikifeat_core::text::visible_length(&caption.text)).bright_white()
    );
}
