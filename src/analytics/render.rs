//! HTML for the analytics dashboard tabs.

use crate::analytics::aggregate::{summarize, AnalyticsSummary};
use crate::analytics::store::AnalyticsStore;
use crate::parse::escape_html;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Overview,
    PageViews,
    Heatmap,
    Performance,
}

impl FromStr for Tab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "overview" => Ok(Tab::Overview),
            "pageviews" => Ok(Tab::PageViews),
            "heatmap" => Ok(Tab::Heatmap),
            "performance" => Ok(Tab::Performance),
            other => Err(format!("unknown dashboard tab '{}'", other)),
        }
    }
}

/// The root path is stored as "" on some hosts
fn page_label(path: &str) -> String {
    if path.is_empty() {
        "Homepage".to_string()
    } else {
        escape_html(path)
    }
}

pub fn render_tab(tab: Tab, store: &AnalyticsStore, top: usize) -> String {
    match tab {
        Tab::Overview => render_overview(&summarize(store, top)),
        Tab::PageViews => render_page_views(store),
        Tab::Heatmap => render_heatmap_view(store),
        Tab::Performance => render_performance(store),
    }
}

fn card(icon: &str, value: &str, label: &str) -> String {
    format!(
        r#"<div class="analytics-card"><div class="card-icon">{}</div><div class="card-value">{}</div><div class="card-label">{}</div></div>"#,
        icon, value, label
    )
}

pub fn render_overview(summary: &AnalyticsSummary) -> String {
    let cards = [
        card("👁️", &summary.total_page_views.to_string(), "Total Page Views"),
        card("📱", &summary.total_sessions.to_string(), "Total Sessions"),
        card("⏱️", &format!("{}s", summary.average_session_time), "Avg. Session Time"),
        card("🖱️", &summary.total_clicks.to_string(), "Total Clicks"),
    ]
    .concat();

    let pages: String = summary
        .top_pages
        .iter()
        .map(|page| {
            format!(
                r#"<li><span class="page-path">{}</span><span class="page-views">{} views</span></li>"#,
                page_label(&page.path),
                page.views
            )
        })
        .collect();

    format!(
        r#"<div class="tab-content active" id="overview"><div class="analytics-grid">{}</div><div class="top-pages"><h3>🏆 Top Pages</h3><ul>{}</ul></div></div>"#,
        cards, pages
    )
}

/// Every page with a bar proportional to the busiest page
pub fn render_page_views(store: &AnalyticsStore) -> String {
    let max = store.page_views.values().copied().max().unwrap_or(0).max(1);
    let rows: String = store
        .page_views
        .iter()
        .map(|(path, views)| {
            let width = (*views as f64 / max as f64 * 100.0).round();
            format!(
                r#"<div class="page-views-row"><span class="page-path">{}</span><div class="page-views-bar" style="width: {}%"></div><span class="page-views">{}</span></div>"#,
                page_label(path),
                width,
                views
            )
        })
        .collect();

    format!(
        r#"<div class="tab-content active" id="pageviews"><div class="page-views-chart"><h3>📄 Page Views Breakdown</h3>{}</div></div>"#,
        rows
    )
}

pub fn render_heatmap_view(store: &AnalyticsStore) -> String {
    format!(
        r#"<div class="tab-content active" id="heatmap"><h3>🔥 Click Heatmap</h3><div class="heatmap-container"><canvas id="heatmap-canvas"></canvas></div><p class="heatmap-info">Red areas indicate more clicks. Total clicks: {}</p></div>"#,
        store.heatmap_data.len()
    )
}

pub fn render_performance(store: &AnalyticsStore) -> String {
    let items: String = store
        .performance
        .iter()
        .map(|(page, metrics)| {
            format!(
                r#"<div class="performance-item"><div class="perf-page">{}</div><div class="perf-metrics"><span>Load Time: <strong>{}ms</strong></span><span>DOM Ready: <strong>{}ms</strong></span><span>First Paint: <strong>{}ms</strong></span></div></div>"#,
                page_label(page),
                metrics.load_time,
                metrics.dom_ready,
                metrics.first_paint.round()
            )
        })
        .collect();

    format!(
        r#"<div class="tab-content active" id="performance"><h3>⚡ Performance Metrics</h3><div class="performance-list">{}</div></div>"#,
        items
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> AnalyticsStore {
        serde_json::from_str(
            r#"{
                "pageViews": {"": 2, "/projects.html": 4},
                "heatmapData": [{"x": 1, "y": 2}, {"x": 3, "y": 4}],
                "performance": {"/projects.html": {"loadTime": 812, "domReady": 430, "firstPaint": 215.6}}
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_tab_names() {
        assert_eq!("pageviews".parse::<Tab>(), Ok(Tab::PageViews));
        assert!("settings".parse::<Tab>().is_err());
    }

    #[test]
    fn test_overview() {
        let html = render_tab(Tab::Overview, &store(), 5);
        assert!(html.contains(r#"<div class="card-value">6</div>"#));
        assert!(html.contains(r#"<div class="card-value">0s</div>"#));
        let projects = html.find("/projects.html").unwrap();
        let home = html.find("Homepage").unwrap();
        assert!(projects < home);
    }

    #[test]
    fn test_page_views_bars() {
        let html = render_page_views(&store());
        assert!(html.contains("width: 50%"));
        assert!(html.contains("width: 100%"));
    }

    #[test]
    fn test_heatmap_view_counts_points() {
        assert!(render_heatmap_view(&store()).contains("Total clicks: 2"));
    }

    #[test]
    fn test_performance() {
        let html = render_performance(&store());
        assert!(html.contains("Load Time: <strong>812ms</strong>"));
        assert!(html.contains("First Paint: <strong>216ms</strong>"));
    }
}
