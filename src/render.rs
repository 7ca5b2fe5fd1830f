use crate::models::{Catalog, Movie, RatingStats};

/// Page template compiled into the binary; placeholders are swapped at
/// render time.
const PAGE_TEMPLATE: &str = include_str!("../templates/index_template.html");

/// Render entries as a numbered listing, one `N. Title, Year: Y, Rating: R`
/// line per movie. Numbering is 1-based and assigned here, never stored.
pub fn render_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a Movie)>) -> String {
    entries
        .into_iter()
        .enumerate()
        .map(|(index, (title, movie))| {
            format!(
                "{}. {}, Year: {}, Rating: {}",
                index + 1,
                title,
                movie.year,
                movie.rating
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render a whole catalog as a numbered listing in iteration order.
pub fn render_listing(catalog: &Catalog) -> String {
    render_entries(catalog.iter())
}

/// Render the aggregate rating block. The average is rounded to two
/// decimals here, at the display boundary.
pub fn render_stats(stats: &RatingStats) -> String {
    format!(
        "Max rating: {}\nMin rating: {}\nAverage rating: {:.2}",
        stats.max, stats.min, stats.average
    )
}

/// Escape text for interpolation into HTML content or attribute values.
fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Render the `<li>` movie cards for the page's grid.
fn render_movie_grid(catalog: &Catalog) -> String {
    catalog
        .iter()
        .map(|(title, movie)| {
            format!(
                r#"<li>
    <div class="movie">
        <img class="movie-poster" src="{}" alt="{}"/>
        <div class="movie-title">{}</div>
        <div class="movie-year">{}</div>
    </div>
</li>"#,
                escape_html(movie.poster.as_deref().unwrap_or("")),
                escape_html(title),
                escape_html(title),
                escape_html(&movie.year),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render the full static page for a catalog.
pub fn render_page(catalog: &Catalog, heading: &str, owner: &str) -> String {
    PAGE_TEMPLATE
        .replace("__TEMPLATE_OWNER__", &escape_html(owner))
        .replace("__TEMPLATE_TITLE__", &escape_html(heading))
        .replace("__TEMPLATE_MOVIE_GRID__", &render_movie_grid(catalog))
}
