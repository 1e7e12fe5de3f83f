//! JavaScript bindings.
//!
//! `DatagridView` wraps a JS view object (any object with `num_rows`,
//! `column_paths`, `schema`, `get_config`, `to_columns`, `expand`,
//! `collapse` and `set_depth` methods returning values or promises) and
//! exposes the grid's entry points as promise-returning methods.

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::{Array, Function, Promise, Reflect};
use serde::de::DeserializeOwned;
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{future_to_promise, JsFuture};

use super::{ClickAction, Datagrid, GridEvent};
use crate::error::{DatagridError, Result};
use crate::layout::{to_f64, Viewport};
use crate::source::{ColumnPage, DataSource, Schema};
use crate::types::{GridOptions, Modifiers, SortEntry, Value, ViewConfig};

fn js_error(value: &JsValue) -> DatagridError {
    DatagridError::Source(value.as_string().unwrap_or_else(|| format!("{value:?}")))
}

/// A JS view object seen as a [`DataSource`].
pub struct JsDataSource {
    view: JsValue,
}

impl JsDataSource {
    async fn call(&self, method: &str, args: &[JsValue]) -> Result<JsValue> {
        let func = Reflect::get(&self.view, &JsValue::from_str(method))
            .map_err(|e| js_error(&e))?
            .dyn_into::<Function>()
            .map_err(|_| DatagridError::Source(format!("view has no method {method}")))?;
        let array: Array = args.iter().collect();
        let returned = Reflect::apply(&func, &self.view, &array).map_err(|e| js_error(&e))?;
        JsFuture::from(Promise::resolve(&returned))
            .await
            .map_err(|e| js_error(&e))
    }

    async fn call_as<T: DeserializeOwned>(&self, method: &str, args: &[JsValue]) -> Result<T> {
        let value = self.call(method, args).await?;
        serde_wasm_bindgen::from_value(value).map_err(|e| DatagridError::Source(e.to_string()))
    }
}

impl DataSource for JsDataSource {
    async fn row_count(&self) -> Result<usize> {
        self.call_as("num_rows", &[]).await
    }

    async fn column_paths(&self) -> Result<Vec<String>> {
        self.call_as("column_paths", &[]).await
    }

    async fn schema(&self) -> Result<Schema> {
        self.call_as("schema", &[]).await
    }

    async fn config(&self) -> Result<ViewConfig> {
        self.call_as("get_config", &[]).await
    }

    async fn fetch_page(&self, viewport: &Viewport) -> Result<ColumnPage> {
        let arg = serde_wasm_bindgen::to_value(viewport)
            .map_err(|e| DatagridError::Other(e.to_string()))?;
        let columns: std::collections::HashMap<String, Vec<Value>> =
            self.call_as("to_columns", &[arg]).await?;
        Ok(columns.into_iter().collect())
    }

    async fn expand(&self, row: usize) -> Result<()> {
        self.call("expand", &[JsValue::from_f64(to_f64(row))]).await?;
        Ok(())
    }

    async fn collapse(&self, row: usize) -> Result<()> {
        self.call("collapse", &[JsValue::from_f64(to_f64(row))]).await?;
        Ok(())
    }

    async fn set_depth(&self, depth: usize) -> Result<()> {
        self.call("set_depth", &[JsValue::from_f64(to_f64(depth))])
            .await?;
        Ok(())
    }
}

/// Event payload handed to the JS callback.
#[derive(Serialize)]
struct JsEvent<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    staged: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sort: Option<&'a [SortEntry]>,
}

impl<'a> From<&'a GridEvent> for JsEvent<'a> {
    fn from(event: &'a GridEvent) -> Self {
        let (kind, staged, sort) = match event {
            GridEvent::BeforeUpdate { staged } => ("before-update", Some(*staged), None),
            GridEvent::AfterUpdate { staged } => ("after-update", Some(*staged), None),
            GridEvent::Scroll => ("scroll", None, None),
            GridEvent::SortChanged(sort) => ("sort-changed", None, Some(sort.as_slice())),
        };
        Self { kind, staged, sort }
    }
}

#[wasm_bindgen]
pub struct DatagridView {
    grid: Rc<Datagrid<JsDataSource>>,
    callback: Rc<RefCell<Option<Function>>>,
}

#[wasm_bindgen]
impl DatagridView {
    /// Create a grid over a JS view. `options` is a partial `GridOptions`
    /// object or `undefined`.
    #[wasm_bindgen(constructor)]
    pub fn new(
        view: JsValue,
        options: JsValue,
        width: f64,
        height: f64,
    ) -> std::result::Result<DatagridView, JsValue> {
        console_error_panic_hook::set_once();
        let options: GridOptions = if options.is_undefined() || options.is_null() {
            GridOptions::default()
        } else {
            serde_wasm_bindgen::from_value(options)?
        };
        let grid = Datagrid::new(JsDataSource { view }, options).with_size(width, height);

        let callback: Rc<RefCell<Option<Function>>> = Rc::new(RefCell::new(None));
        let slot = Rc::clone(&callback);
        grid.subscribe(move |event| {
            let Some(func) = slot.borrow().clone() else {
                return;
            };
            if let Ok(payload) = serde_wasm_bindgen::to_value(&JsEvent::from(event)) {
                let _ = func.call1(&JsValue::NULL, &payload);
            }
        });
        Ok(Self {
            grid: Rc::new(grid),
            callback,
        })
    }

    /// Register a JS callback receiving `{type, staged?, sort?}` events.
    #[wasm_bindgen]
    pub fn set_event_callback(&self, callback: Option<Function>) {
        *self.callback.borrow_mut() = callback;
    }

    #[wasm_bindgen]
    pub fn draw(&self, force: bool, preserve_scroll: bool) -> Promise {
        let grid = Rc::clone(&self.grid);
        future_to_promise(async move {
            let outcome = grid.draw(force, preserve_scroll).await?;
            Ok(serde_wasm_bindgen::to_value(&outcome)?)
        })
    }

    #[wasm_bindgen]
    pub fn load(&self) -> Promise {
        let grid = Rc::clone(&self.grid);
        future_to_promise(async move {
            let outcome = grid.load().await?;
            Ok(serde_wasm_bindgen::to_value(&outcome)?)
        })
    }

    #[wasm_bindgen]
    pub fn update(&self) -> Promise {
        let grid = Rc::clone(&self.grid);
        future_to_promise(async move {
            grid.update().await;
            Ok(JsValue::UNDEFINED)
        })
    }

    #[wasm_bindgen]
    pub fn resize(&self, width: f64, height: f64) -> Promise {
        let grid = Rc::clone(&self.grid);
        future_to_promise(async move {
            let outcome = grid.resize(width, height).await?;
            Ok(serde_wasm_bindgen::to_value(&outcome)?)
        })
    }

    #[wasm_bindgen]
    pub fn scroll_to(&self, top: f64, left: f64) -> Promise {
        let grid = Rc::clone(&self.grid);
        future_to_promise(async move {
            let outcome = grid.scroll_to(top, left).await?;
            Ok(serde_wasm_bindgen::to_value(&outcome)?)
        })
    }

    #[wasm_bindgen]
    pub fn on_wheel(&self, delta_x: f64, delta_y: f64) -> Promise {
        let grid = Rc::clone(&self.grid);
        future_to_promise(async move {
            let outcome = grid.on_wheel(delta_x, delta_y).await?;
            Ok(serde_wasm_bindgen::to_value(&outcome)?)
        })
    }

    /// Click at container pixels. Resolves to whether the click did
    /// anything.
    #[wasm_bindgen]
    pub fn click(&self, x: f64, y: f64, shift: bool, alt: bool) -> Promise {
        let grid = Rc::clone(&self.grid);
        future_to_promise(async move {
            let target = grid.hit_test(x, y);
            let action = grid.on_click(target, Modifiers { shift, alt }).await?;
            Ok(JsValue::from_bool(action != ClickAction::Ignored))
        })
    }

    #[wasm_bindgen]
    pub fn reset_scroll(&self) {
        self.grid.reset_scroll();
    }

    #[wasm_bindgen]
    pub fn attach(&self) {
        self.grid.attach();
    }

    #[wasm_bindgen]
    pub fn detach(&self) {
        self.grid.detach();
    }

    #[wasm_bindgen]
    pub fn clear(&self) {
        self.grid.clear();
    }

    /// HTML of the visible table, or `undefined` while nothing is shown.
    #[wasm_bindgen]
    pub fn html(&self) -> Option<String> {
        self.grid.to_html()
    }

    #[wasm_bindgen]
    pub fn virtual_size(&self) -> Vec<f64> {
        let container = self.grid.scroll_container();
        vec![
            container.virtual_width().unwrap_or(container.width()),
            container.virtual_height(),
        ]
    }

    #[wasm_bindgen]
    pub fn stats(&self) -> std::result::Result<JsValue, JsValue> {
        Ok(serde_wasm_bindgen::to_value(&self.grid.stats())?)
    }
}
