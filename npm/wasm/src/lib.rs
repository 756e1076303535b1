use wasm_bindgen::prelude::*;
use web_sys::Storage;

use session_vault::{
    browser, identifier, Clock, ExpiringKeyStore, Lookup, StorageBackend, StorageScope, VaultCipher,
    VaultConfig, VaultError,
};

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn describe(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

/// [`StorageBackend`] over the page's `localStorage` or `sessionStorage`.
pub struct WebStorage {
    inner: Storage,
}

impl WebStorage {
    /// The page's `localStorage`.
    pub fn local() -> session_vault::Result<Self> {
        let window = web_sys::window()
            .ok_or_else(|| VaultError::StorageUnavailable("no window".to_string()))?;
        Self::from_lookup("localStorage", window.local_storage())
    }

    /// The page's `sessionStorage`.
    pub fn session() -> session_vault::Result<Self> {
        let window = web_sys::window()
            .ok_or_else(|| VaultError::StorageUnavailable("no window".to_string()))?;
        Self::from_lookup("sessionStorage", window.session_storage())
    }

    fn from_lookup(
        name: &str,
        lookup: Result<Option<Storage>, JsValue>,
    ) -> session_vault::Result<Self> {
        match lookup {
            Ok(Some(inner)) => Ok(Self { inner }),
            Ok(None) => Err(VaultError::StorageUnavailable(format!(
                "{name} is not available"
            ))),
            Err(e) => Err(VaultError::StorageUnavailable(format!(
                "{name} is disabled: {}",
                describe(&e)
            ))),
        }
    }
}

impl StorageBackend for WebStorage {
    fn get_item(&self, key: &str) -> session_vault::Result<Option<String>> {
        self.inner
            .get_item(key)
            .map_err(|e| VaultError::StorageError(describe(&e)))
    }

    fn set_item(&self, key: &str, value: &str) -> session_vault::Result<()> {
        self.inner
            .set_item(key, value)
            .map_err(|e| VaultError::StorageError(describe(&e)))
    }

    fn remove_item(&self, key: &str) -> session_vault::Result<()> {
        self.inner
            .remove_item(key)
            .map_err(|e| VaultError::StorageError(describe(&e)))
    }

    fn clear(&self) -> session_vault::Result<()> {
        self.inner
            .clear()
            .map_err(|e| VaultError::StorageError(describe(&e)))
    }
}

/// [`Clock`] reading the browser's `Date.now()`.
pub struct JsClock;

impl Clock for JsClock {
    fn now_millis(&self) -> u64 {
        js_sys::Date::now() as u64
    }
}

/// Expiring key-value store over the page's web storage.
#[wasm_bindgen]
pub struct WasmVault {
    inner: ExpiringKeyStore<WebStorage>,
}

#[wasm_bindgen]
impl WasmVault {
    /// Open the vault over the page's storage.
    ///
    /// Hardened mode needs a 32-byte master key.
    #[wasm_bindgen(constructor)]
    pub fn new(hardened: bool, master_key: Option<Vec<u8>>) -> Result<WasmVault, JsValue> {
        let config = if hardened {
            VaultConfig::hardened()
        } else {
            VaultConfig::development()
        };
        let session = WebStorage::session().map_err(js_err)?;
        let persistent = WebStorage::local().map_err(js_err)?;
        let mut builder = ExpiringKeyStore::builder(session, persistent)
            .config(config)
            .clock(std::sync::Arc::new(JsClock));

        if let Some(bytes) = master_key {
            let key: [u8; 32] = bytes
                .try_into()
                .map_err(|_| JsValue::from_str("master key must be 32 bytes"))?;
            builder = builder.cipher(VaultCipher::new(&key).map_err(js_err)?);
        }

        Ok(WasmVault {
            inner: builder.build().map_err(js_err)?,
        })
    }

    /// Store a JSON value. `ttl_days` only applies to the persistent scope.
    #[wasm_bindgen]
    pub fn set(
        &self,
        scope: &str,
        key: &str,
        value_json: &str,
        ttl_days: Option<u32>,
    ) -> Result<(), JsValue> {
        let value: serde_json::Value = serde_json::from_str(value_json).map_err(js_err)?;
        self.inner
            .set(parse_scope(scope)?, key, &value, ttl_days)
            .map_err(js_err)
    }

    /// Read a value as JSON, or `undefined` if absent or expired.
    #[wasm_bindgen]
    pub fn get(&self, scope: &str, key: &str) -> Result<Option<String>, JsValue> {
        let value: Option<serde_json::Value> = self
            .inner
            .get_value(parse_scope(scope)?, key)
            .map_err(js_err)?;
        value
            .map(|v| serde_json::to_string(&v).map_err(js_err))
            .transpose()
    }

    /// Read a value and report whether the read logged the session out.
    ///
    /// Returns `{"value": <json or null>, "cascadeTriggered": bool}`.
    #[wasm_bindgen]
    pub fn lookup(&self, scope: &str, key: &str) -> Result<String, JsValue> {
        let lookup: Lookup<serde_json::Value> =
            self.inner.get(parse_scope(scope)?, key).map_err(js_err)?;
        let body = serde_json::json!({
            "value": lookup.value,
            "cascadeTriggered": lookup.cascade_triggered,
        });
        serde_json::to_string(&body).map_err(js_err)
    }

    /// Remove a single entry. Absent keys are a no-op.
    #[wasm_bindgen]
    pub fn clear(&self, scope: &str, key: &str) -> Result<(), JsValue> {
        self.inner.clear(parse_scope(scope)?, key).map_err(js_err)
    }

    /// Clear `sessionStorage` and every identity key in `localStorage`.
    #[wasm_bindgen]
    pub fn logout(&self) -> Result<(), JsValue> {
        self.inner.logout_cascade().map_err(js_err)
    }

    /// `true` if both the user id and token hold non-empty values.
    #[wasm_bindgen(js_name = isAuthenticated)]
    pub fn is_authenticated(&self) -> Result<bool, JsValue> {
        self.inner.is_authenticated().map_err(js_err)
    }
}

/// Generate a UUID-shaped identifier. Not for security use.
#[wasm_bindgen]
pub fn uuid() -> String {
    identifier::uuid()
}

/// `WebPage_<uuid>_<Date.now()>`.
#[wasm_bindgen(js_name = traceId)]
pub fn trace_id() -> String {
    identifier::trace_id_at(&JsClock)
}

/// Name of the current browser (`"Chrome"`, `"IE"`, ...), if recognised.
#[wasm_bindgen(js_name = detectBrowser)]
pub fn detect_browser() -> Result<Option<String>, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let navigator = window.navigator();
    let user_agent = navigator.user_agent()?;
    let mimes = navigator_mime_types(&navigator);
    Ok(browser::detect(&user_agent, &mimes).map(|info| info.kind.name().to_string()))
}

/// `true` if the current browser's name matches `name`.
#[wasm_bindgen(js_name = isBrowser)]
pub fn is_browser(name: &str) -> Result<bool, JsValue> {
    Ok(detect_browser()?.as_deref() == Some(name))
}

fn navigator_mime_types(navigator: &web_sys::Navigator) -> Vec<String> {
    let Ok(list) = navigator.mime_types() else {
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|i| list.item(i))
        .map(|m| m.type_())
        .collect()
}

fn parse_scope(s: &str) -> Result<StorageScope, JsValue> {
    match s {
        "session" | "sessionStorage" => Ok(StorageScope::Session),
        "persistent" | "local" | "localStorage" => Ok(StorageScope::Persistent),
        other => Err(JsValue::from_str(&format!("unknown scope: {other}"))),
    }
}
