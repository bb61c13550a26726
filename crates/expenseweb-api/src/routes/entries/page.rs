//! Dashboard rendering - full page and HTMX fragments
//!
//! Every fragment endpoint answers with the whole `#dashboard` block so the
//! filter panel, table, summary and creation form always agree.
//!
//! Mutations hold the store's write lock while the snapshot is written, and
//! run inside `block_in_place` so the file I/O does not stall other tasks on
//! the worker. Requests queue behind the lock; at one user that is fine.

use super::api::{parse_criteria, parse_draft, parse_form, FORM_FILTER};
use crate::{page_response, ApiError, AppState};
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::Html;
use expenseweb_config::{DisplayConfig, SymbolPosition};
use expenseweb_core::{
    Category, CategoryFilter, DefaultErrorLogger, Entry, EntryDraft, EntryType, ErrorContext,
    ErrorLogger, FilterCriteria, LedgerStore, Totals, TypeFilter,
};
use expenseweb_utils::{escape_html, format_amount};
use std::collections::HashMap;

const SWAP_ATTRS: &str = "hx-target='#dashboard' hx-swap='outerHTML'";

/// Dashboard page with default filters and a fresh draft
pub async fn page_dashboard(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Html<String> {
    let store = state.store.read().await;
    let content = render_dashboard(
        &store,
        &state.config.display,
        &FilterCriteria::default(),
        &EntryDraft::default(),
    );
    Html(page_response(&headers, &state.config.display.title, &content))
}

/// HTMX: Dashboard for the given filter and draft
pub async fn htmx_dashboard_view(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Html<String>, ApiError> {
    let criteria = parse_criteria(&params, &FORM_FILTER)?;
    let draft = parse_draft(&params)?;

    let store = state.store.read().await;
    Ok(Html(render_dashboard(&store, &state.config.display, &criteria, &draft)))
}

/// HTMX: Create an entry from the form, then re-render.
/// A rejected draft comes back as typed.
pub async fn htmx_entry_store(
    State(state): State<AppState>,
    body: String,
) -> Result<Html<String>, ApiError> {
    let params = parse_form(&body);
    let criteria = parse_criteria(&params, &FORM_FILTER)?;
    let mut draft = parse_draft(&params)?;

    let mut store = state.store.write().await;
    if let Err(e) = tokio::task::block_in_place(|| store.create(&mut draft)) {
        DefaultErrorLogger.log_error(&e, &ErrorContext::new("create"));
    }
    Ok(Html(render_dashboard(&store, &state.config.display, &criteria, &draft)))
}

/// HTMX: Delete an entry, then re-render.
/// The included filter and draft fields arrive form-encoded in the body;
/// query parameters are accepted too, with the body winning.
pub async fn htmx_entry_delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(mut params): Query<HashMap<String, String>>,
    body: String,
) -> Result<Html<String>, ApiError> {
    params.extend(parse_form(&body));
    let criteria = parse_criteria(&params, &FORM_FILTER)?;
    let draft = parse_draft(&params)?;

    let mut store = state.store.write().await;
    if let Err(e) = tokio::task::block_in_place(|| store.delete(&id)) {
        DefaultErrorLogger.log_error(&e, &ErrorContext::new("delete").with_entry_id(id.as_str()));
    }
    Ok(Html(render_dashboard(&store, &state.config.display, &criteria, &draft)))
}

// ==================== Rendering ====================

/// The `#dashboard` block: filter panel, table, summary, creation form
pub fn render_dashboard(
    store: &LedgerStore,
    display: &DisplayConfig,
    criteria: &FilterCriteria,
    draft: &EntryDraft,
) -> String {
    let visible = store.filtered(criteria);
    let totals = store.totals(criteria);

    format!(
        r#"<div id='dashboard' class='space-y-6'>
    {}
    {}
    {}
    {}
</div>"#,
        render_filter_panel(criteria),
        render_table(&visible, display, store.len()),
        render_summary(&totals, display),
        render_entry_form(draft)
    )
}

fn render_filter_panel(criteria: &FilterCriteria) -> String {
    let category_selected = match criteria.category {
        CategoryFilter::All => "all",
        CategoryFilter::Only(c) => c.as_str(),
    };
    let type_selected = match criteria.entry_type {
        TypeFilter::All => "all",
        TypeFilter::Only(t) => t.as_str(),
    };

    let category_values: Vec<&str> = std::iter::once("all")
        .chain(Category::ALL.iter().map(|c| c.as_str()))
        .collect();
    let type_values: Vec<&str> = std::iter::once("all")
        .chain(EntryType::ALL.iter().map(|t| t.as_str()))
        .collect();

    format!(
        r#"<form id='filter-panel' class='bg-white rounded-xl shadow-sm p-4 flex flex-wrap items-end gap-4'
        hx-get='/dashboard/view' hx-trigger='change' hx-include='#entry-form' {swap}>
        <label class='text-sm text-gray-600'>From
            <input type='date' name='from' value='{from}' class='block mt-1 px-3 py-2 border rounded-lg'>
        </label>
        <label class='text-sm text-gray-600'>To
            <input type='date' name='to' value='{to}' class='block mt-1 px-3 py-2 border rounded-lg'>
        </label>
        <label class='text-sm text-gray-600'>Category
            <select name='filter_category' class='block mt-1 px-3 py-2 border rounded-lg'>{categories}</select>
        </label>
        <label class='text-sm text-gray-600'>Type
            <select name='filter_type' class='block mt-1 px-3 py-2 border rounded-lg'>{types}</select>
        </label>
        <button type='button' hx-get='/dashboard/view' hx-include='#entry-form' {swap}
            class='px-4 py-2 bg-gray-100 text-gray-700 rounded-lg hover:bg-gray-200'>Clear</button>
    </form>"#,
        swap = SWAP_ATTRS,
        from = escape_html(&criteria.from_date),
        to = escape_html(&criteria.to_date),
        categories = select_options(&category_values, category_selected),
        types = select_options(&type_values, type_selected),
    )
}

fn render_table(entries: &[&Entry], display: &DisplayConfig, ledger_len: usize) -> String {
    if entries.is_empty() {
        let message = if ledger_len == 0 {
            "No entries yet"
        } else {
            "No entries match the current filter"
        };
        return format!(
            "<div class='bg-white rounded-xl shadow-sm p-8 text-center text-gray-500'>{}</div>",
            message
        );
    }

    let rows: Vec<String> = entries.iter().map(|e| render_row(e, display)).collect();

    format!(
        r#"<div class='bg-white rounded-xl shadow-sm overflow-hidden'>
        <table class='w-full text-sm'>
            <thead class='bg-gray-50 text-gray-600'>
                <tr>
                    <th class='text-left px-4 py-2'>Date</th>
                    <th class='text-left px-4 py-2'>Title</th>
                    <th class='text-left px-4 py-2'>Type</th>
                    <th class='text-left px-4 py-2'>Category</th>
                    <th class='text-right px-4 py-2'>Amount</th>
                    <th class='px-4 py-2'></th>
                </tr>
            </thead>
            <tbody>{}</tbody>
        </table>
    </div>"#,
        rows.join("")
    )
}

fn render_row(entry: &Entry, display: &DisplayConfig) -> String {
    let (badge, amount_class) = if entry.is_income() {
        ("bg-green-100 text-green-700", "text-green-600")
    } else {
        ("bg-red-100 text-red-700", "text-red-600")
    };
    let delete_url = format!("/entries/{}", urlencoding::encode(&entry.id));

    format!(
        r#"<tr class='border-t hover:bg-gray-50'>
                    <td class='px-4 py-2 text-gray-600'>{date}</td>
                    <td class='px-4 py-2'>{title}</td>
                    <td class='px-4 py-2'><span class='px-2 py-0.5 rounded-full text-xs {badge}'>{entry_type}</span></td>
                    <td class='px-4 py-2'>{category}</td>
                    <td class='px-4 py-2 text-right font-medium {amount_class}'>{amount}</td>
                    <td class='px-4 py-2 text-right'>
                        <button hx-delete='{url}' hx-include='#filter-panel, #entry-form' {swap}
                            class='text-gray-400 hover:text-red-600'>Delete</button>
                    </td>
                </tr>"#,
        date = escape_html(&entry.date),
        title = escape_html(&entry.title),
        badge = badge,
        entry_type = entry.entry_type,
        category = entry.category,
        amount_class = amount_class,
        amount = escape_html(&display_amount(entry.amount, display)),
        url = escape_html(&delete_url),
        swap = SWAP_ATTRS,
    )
}

fn render_summary(totals: &Totals, display: &DisplayConfig) -> String {
    let balance_class = if totals.balance < 0.0 {
        "text-red-600"
    } else {
        "text-green-600"
    };

    format!(
        r#"<div id='summary' class='grid grid-cols-1 md:grid-cols-3 gap-4'>
        <div class='bg-green-50 p-4 rounded-lg border border-green-200'><p class='text-sm text-green-600'>Income</p><p class='text-2xl font-bold text-green-700'>{}</p></div>
        <div class='bg-red-50 p-4 rounded-lg border border-red-200'><p class='text-sm text-red-600'>Expense</p><p class='text-2xl font-bold text-red-700'>{}</p></div>
        <div class='bg-white p-4 rounded-lg border'><p class='text-sm text-gray-600'>Balance</p><p class='text-2xl font-bold {}'>{}</p></div>
    </div>"#,
        escape_html(&display_amount(totals.total_income, display)),
        escape_html(&display_amount(totals.total_expense, display)),
        balance_class,
        escape_html(&display_amount(totals.balance, display)),
    )
}

fn render_entry_form(draft: &EntryDraft) -> String {
    let type_values: Vec<&str> = EntryType::ALL.iter().map(|t| t.as_str()).collect();
    let category_values: Vec<&str> = Category::ALL.iter().map(|c| c.as_str()).collect();

    format!(
        r#"<form id='entry-form' class='bg-white rounded-xl shadow-sm p-4 grid grid-cols-1 md:grid-cols-6 gap-3 items-end'
        hx-post='/entries' hx-include='#filter-panel' {swap}>
        <input type='text' name='title' value='{title}' placeholder='Title' class='md:col-span-2 px-3 py-2 border rounded-lg'>
        <input type='date' name='date' value='{date}' class='px-3 py-2 border rounded-lg'>
        <select name='entry_type' class='px-3 py-2 border rounded-lg'>{types}</select>
        <select name='category' class='px-3 py-2 border rounded-lg'>{categories}</select>
        <div class='flex gap-2'>
            <input type='text' name='amount' value='{amount}' placeholder='0.00' inputmode='decimal' class='w-full px-3 py-2 border rounded-lg'>
            <button type='submit' class='px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>Add</button>
        </div>
    </form>"#,
        swap = SWAP_ATTRS,
        title = escape_html(&draft.title),
        date = escape_html(&draft.date),
        types = select_options(&type_values, draft.entry_type.as_str()),
        categories = select_options(&category_values, draft.category.as_str()),
        amount = escape_html(&draft.amount),
    )
}

fn select_options(values: &[&str], selected: &str) -> String {
    values
        .iter()
        .map(|value| {
            format!(
                "<option value='{}'{}>{}</option>",
                value,
                if *value == selected { " selected" } else { "" },
                capitalize(value)
            )
        })
        .collect()
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Amount with the configured decimals, separator and currency symbol
pub fn display_amount(value: f64, display: &DisplayConfig) -> String {
    let number = format_amount(value, display.decimal_places, &display.thousands_separator);
    if display.currency_symbol.is_empty() {
        return number;
    }
    match display.symbol_position {
        SymbolPosition::Before => format!("{}{}", display.currency_symbol, number),
        SymbolPosition::After => format!("{} {}", number, display.currency_symbol),
    }
}
