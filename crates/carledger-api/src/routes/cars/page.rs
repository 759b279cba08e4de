//! Cars page rendering - index page and HTMX partials

use crate::AppState;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::Html;
use carledger_core::{sort_by_numeric_id, Car, CoreError, CoreResult};
use std::collections::HashMap;

fn escape_html(content: &str) -> String {
    content
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Table rows for all cars, sorted by numeric id
pub fn render_car_rows(cars: &[Car]) -> String {
    if cars.is_empty() {
        return "<tr><td colspan='5' class='py-4 text-center text-gray-500'>No cars recorded</td></tr>".to_string();
    }

    cars.iter()
        .map(|car| {
            format!(
                r#"<tr class='border-b'><td class='py-2'><a href='/?id={}' class='text-indigo-600'>{}</a></td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>"#,
                urlencoding::encode(&car.id),
                escape_html(&car.id),
                escape_html(&car.make),
                escape_html(&car.model),
                escape_html(&car.color),
                escape_html(&car.owner),
            )
        })
        .collect()
}

fn render_lookup(id: &str, car: Option<&Car>) -> String {
    match car {
        Some(car) => format!(
            r#"<div id='query_car' class='bg-green-50 border border-green-200 p-4 rounded-lg mb-6'>
                <p class='font-medium'>{} {} ({})</p><p class='text-sm text-gray-600'>Holder: {}</p>
            </div>"#,
            escape_html(&car.make),
            escape_html(&car.model),
            escape_html(&car.color),
            escape_html(&car.owner),
        ),
        None => format!(
            r#"<div id='error_query' class='bg-red-50 border border-red-200 p-4 rounded-lg mb-6 text-red-700'>{} ({})</div>"#,
            carledger_core::wire::CAR_NOT_FOUND,
            escape_html(id),
        ),
    }
}

/// Shown instead of a listing or lookup when the ledger itself failed
fn render_ledger_error(error: &CoreError) -> String {
    format!(
        r#"<div id='error_ledger' class='bg-red-50 border border-red-200 p-4 rounded-lg mb-6 text-red-700'>Ledger unavailable: {}</div>"#,
        escape_html(&error.to_string()),
    )
}

fn render_listing(cars: &CoreResult<Vec<Car>>) -> String {
    match cars {
        Ok(cars) => render_car_rows(cars),
        Err(e) => format!("<tr><td colspan='5'>{}</td></tr>", render_ledger_error(e)),
    }
}

async fn sorted_cars(state: &AppState) -> CoreResult<Vec<Car>> {
    let entries = state.ledger.get_all_cars().await.map_err(|e| {
        log::error!(target: "carledger::page", "Failed to list cars: {}", e);
        e
    })?;
    let mut cars: Vec<Car> = entries.into_iter().map(|e| e.into_car()).collect();
    sort_by_numeric_id(&mut cars);
    Ok(cars)
}

/// HTMX: car table body
pub async fn htmx_cars_list(State(state): State<AppState>) -> Html<String> {
    Html(render_listing(&sorted_cars(&state).await))
}

/// Index page: lookup result (when `?id=` is given) and the car table
pub async fn page_index(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Html<String> {
    let lookup = match params.get("id").filter(|id| !id.is_empty()) {
        Some(id) => match state.ledger.get_car(id).await {
            Ok(car) => render_lookup(id, car.as_ref()),
            Err(e) => {
                log::error!(target: "carledger::page", "Lookup of {} failed: {}", id, e);
                render_ledger_error(&e)
            }
        },
        None => String::new(),
    };

    let rows = render_listing(&sorted_cars(&state).await);

    let inner_content = format!(
        r#"<div class='mb-6'><h2 class='text-2xl font-bold'>Cars</h2></div>
        <form method='get' action='/' class='flex gap-2 mb-6'>
            <input name='id' placeholder='Car id' class='px-3 py-2 border rounded-lg'>
            <button class='px-4 py-2 bg-indigo-600 text-white rounded-lg'>Query</button>
        </form>
        {}
        <div class='bg-white rounded-xl shadow-sm p-6'>
            <div class='flex justify-between mb-4'>
                <h3 class='text-lg font-semibold'>All cars</h3>
                <button hx-get='/cars/list' hx-target='#car-rows' class='text-sm text-indigo-600'>Refresh</button>
            </div>
            <table class='w-full text-left'>
                <thead><tr class='text-sm text-gray-500'><th>Id</th><th>Make</th><th>Model</th><th>Color</th><th>Holder</th></tr></thead>
                <tbody id='car-rows'>{}</tbody>
            </table>
        </div>"#,
        lookup, rows
    );

    Html(crate::page_response(&headers, "Cars", &inner_content))
}
