use maud::{html, Markup};

use super::models::{CategoryFilter, MediaItem, PortfolioMainPage};
use crate::models::PagedResult;

/// Grid items plus a hidden element carrying the pagination state for the
/// client-side "load more" script.
pub fn render_gallery_page(result: &PagedResult<MediaItem>, filter: CategoryFilter) -> Markup {
    if result.items.is_empty() {
        return html! {
            div.portfolio-no-results data-category=(filter.as_str()) {
                p { "No images found for the selected category." }
            }
        };
    }

    html! {
        @for item in &result.items {
            (render_item(item))
        }
        div.portfolio-pagination-data
            data-category=(filter.as_str())
            data-current-page=(result.page)
            data-page-size=(result.page_size)
            data-total-pages=(result.total_pages)
            data-has-next=(flag(result.has_next_page))
            data-has-previous=(flag(result.has_previous_page))
            data-total-count=(result.total_items)
            style="display: none;" {}
    }
}

fn flag(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

fn render_item(item: &MediaItem) -> Markup {
    html! {
        div.portfolio-item data-category=(item.category.as_str()) data-id=(item.id) {
            img.portfolio-image
                src=(item.url)
                alt=(item.alt)
                title=(item.title)
                loading="lazy"
                data-main-url=(item.original_url);
        }
    }
}

pub fn render_main_page(page: &PortfolioMainPage) -> Markup {
    html! {
        section.portfolio {
            nav.portfolio-filters {
                @for (slug, count) in &page.stats.category_counts {
                    @let filter = CategoryFilter::parse(Some(slug.as_str()));
                    button.portfolio-filter type="button" data-category=(slug) {
                        (filter.display_name()) " (" (count) ")"
                    }
                }
            }
            div.portfolio-grid {
                @for item in &page.images {
                    (render_item(item))
                }
            }
        }
    }
}
