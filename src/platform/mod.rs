//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Seeding (wall clock)
//! - The injected wallet provider (`window.ethereum`)
//! - The host SDK (`window.FarcadeSDK`)

use crate::services::host::{HostBridge, LogHost};

/// Seed for a new session from the wall clock
#[cfg(target_arch = "wasm32")]
pub fn clock_seed() -> u64 {
    js_sys::Date::now() as u64
}

#[cfg(not(target_arch = "wasm32"))]
pub fn clock_seed() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Host bridge for this platform: the SDK when present, the log otherwise
pub fn host_bridge() -> Box<dyn HostBridge> {
    #[cfg(target_arch = "wasm32")]
    {
        if let Some(host) = browser::FarcadeHost::detect() {
            return Box::new(host);
        }
    }
    Box::new(LogHost)
}

#[cfg(target_arch = "wasm32")]
pub mod browser {
    use std::cell::RefCell;
    use std::rc::Rc;

    use async_trait::async_trait;
    use js_sys::{Function, Promise, Reflect};
    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::JsFuture;

    use crate::services::host::{HostBridge, HostContext, HostEvent, HostMessage};
    use crate::services::wallet::{TransactionRequest, WalletError, WalletProvider};

    /// EIP-1193 "user rejected request"
    const USER_REJECTED: f64 = 4001.0;

    fn global(name: &str) -> Option<JsValue> {
        let window = web_sys::window()?;
        let value = Reflect::get(&window, &JsValue::from_str(name)).ok()?;
        (!value.is_undefined() && !value.is_null()).then_some(value)
    }

    fn method(target: &JsValue, name: &str) -> Option<Function> {
        Reflect::get(target, &JsValue::from_str(name))
            .ok()?
            .dyn_into::<Function>()
            .ok()
    }

    fn wallet_error(err: JsValue) -> WalletError {
        let code = Reflect::get(&err, &JsValue::from_str("code"))
            .ok()
            .and_then(|c| c.as_f64());
        if code == Some(USER_REJECTED) {
            return WalletError::Rejected;
        }
        let message = Reflect::get(&err, &JsValue::from_str("message"))
            .ok()
            .and_then(|m| m.as_string())
            .unwrap_or_else(|| "unknown wallet error".to_string());
        WalletError::Failed(message)
    }

    /// The provider injected at `window.ethereum`
    pub struct BrowserWallet {
        provider: JsValue,
    }

    impl BrowserWallet {
        pub fn detect() -> Option<Self> {
            global("ethereum").map(|provider| Self { provider })
        }

        async fn request(&self, method_name: &str, params: JsValue) -> Result<JsValue, WalletError> {
            let request = method(&self.provider, "request").ok_or(WalletError::NoWallet)?;
            let args = js_sys::Object::new();
            Reflect::set(&args, &"method".into(), &JsValue::from_str(method_name))
                .map_err(wallet_error)?;
            Reflect::set(&args, &"params".into(), &params).map_err(wallet_error)?;
            let promise: Promise = request
                .call1(&self.provider, &args)
                .map_err(wallet_error)?
                .dyn_into()
                .map_err(wallet_error)?;
            JsFuture::from(promise).await.map_err(wallet_error)
        }
    }

    #[async_trait(?Send)]
    impl WalletProvider for BrowserWallet {
        async fn request_accounts(&self) -> Result<Vec<String>, WalletError> {
            let accounts = self
                .request("eth_requestAccounts", js_sys::Array::new().into())
                .await?;
            let accounts: js_sys::Array = accounts.dyn_into().map_err(wallet_error)?;
            Ok(accounts.iter().filter_map(|a| a.as_string()).collect())
        }

        async fn send_transaction(&self, tx: &TransactionRequest) -> Result<String, WalletError> {
            let json = serde_json::to_string(tx).map_err(|e| WalletError::Failed(e.to_string()))?;
            let tx = js_sys::JSON::parse(&json).map_err(wallet_error)?;
            let params = js_sys::Array::of1(&tx);
            let hash = self.request("eth_sendTransaction", params.into()).await?;
            hash.as_string()
                .ok_or_else(|| WalletError::Failed("no transaction hash".to_string()))
        }
    }

    /// `window.FarcadeSDK`
    pub struct FarcadeHost {
        sdk: JsValue,
    }

    impl FarcadeHost {
        pub fn detect() -> Option<Self> {
            global("FarcadeSDK").map(|sdk| Self { sdk })
        }

        fn call_action(&self, name: &str, arg: Option<&JsValue>) {
            let actions = Reflect::get(&self.sdk, &"singlePlayer".into())
                .and_then(|sp| Reflect::get(&sp, &"actions".into()));
            let Ok(actions) = actions else {
                log::warn!("Host SDK has no singlePlayer.actions");
                return;
            };
            let Some(f) = method(&actions, name) else {
                log::warn!("Host SDK has no action {name}");
                return;
            };
            let result = match arg {
                Some(arg) => f.call1(&actions, arg),
                None => f.call0(&actions),
            };
            if let Err(err) = result {
                log::warn!("Host action {name} failed: {err:?}");
            }
        }

        /// Player identity from `sdk.context` (a value or a promise of one)
        pub async fn context(&self) -> HostContext {
            let Ok(mut value) = Reflect::get(&self.sdk, &"context".into()) else {
                return HostContext::default();
            };
            if let Ok(promise) = value.clone().dyn_into::<Promise>() {
                value = match JsFuture::from(promise).await {
                    Ok(value) => value,
                    Err(err) => {
                        log::warn!("Host context unavailable: {err:?}");
                        return HostContext::default();
                    }
                };
            }
            match js_sys::JSON::stringify(&value).ok().and_then(|s| s.as_string()) {
                Some(json) => HostContext::from_json(&json),
                None => HostContext::default(),
            }
        }

        /// Register a handler for host messages ("play_again", "toggle_mute")
        pub fn on_message(&self, handler: impl FnMut(HostMessage) + 'static) {
            let Some(on) = method(&self.sdk, "on") else {
                return;
            };
            let handler = Rc::new(RefCell::new(handler));
            for name in ["play_again", "toggle_mute"] {
                let handler = handler.clone();
                let closure = Closure::<dyn FnMut(JsValue)>::new(move |data: JsValue| {
                    let payload = if data.is_undefined() || data.is_null() {
                        None
                    } else {
                        js_sys::JSON::stringify(&data).ok().and_then(|s| s.as_string())
                    };
                    let Some(message) = HostMessage::parse(name, payload.as_deref()) else {
                        return;
                    };
                    let mut handler = handler.borrow_mut();
                    (*handler)(message);
                });
                let _ = on.call2(&self.sdk, &JsValue::from_str(name), closure.as_ref());
                closure.forget();
            }
        }
    }

    impl HostBridge for FarcadeHost {
        fn notify(&self, event: &HostEvent) {
            match event {
                HostEvent::Ready => self.call_action("ready", None),
                HostEvent::Haptic => self.call_action("hapticFeedback", None),
                HostEvent::GameOver { score } => {
                    let arg = js_sys::Object::new();
                    let _ = Reflect::set(&arg, &"score".into(), &JsValue::from_f64(*score as f64));
                    self.call_action("gameOver", Some(&arg));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_seed_moves() {
        assert!(clock_seed() > 0);
    }
}
