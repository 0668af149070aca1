//! Asynchronous asset loaders
//!
//! Natively each request is decoded on its own worker thread; on the web the
//! bytes are fetched by the browser and decoded on the page thread. Either
//! way the result goes back through the request's sender and egui is asked to
//! repaint so the session pumps it.

use orbit_core::{AssetLoader, EnvironmentMap, LoadRequest, LoadedAsset};

#[cfg(not(target_arch = "wasm32"))]
pub use native::ThreadLoader;

#[cfg(target_arch = "wasm32")]
pub use web::FetchLoader;

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::{Path, PathBuf};

    use super::*;
    use orbit_core::asset::load_model;

    /// Decodes each request on a worker thread
    #[derive(Clone)]
    pub struct ThreadLoader {
        root: Option<PathBuf>,
        ctx: Option<egui::Context>,
    }

    impl ThreadLoader {
        /// Loader resolving relative paths against `root` (or the working
        /// directory), repainting `ctx` when a result is ready
        pub fn new(root: Option<PathBuf>, ctx: Option<egui::Context>) -> Self {
            Self { root, ctx }
        }

        pub fn resolve(&self, path: &str) -> PathBuf {
            match &self.root {
                Some(root) if Path::new(path).is_relative() => root.join(path),
                _ => PathBuf::from(path),
            }
        }

        fn spawn<T, F>(&self, request: LoadRequest<T>, load: F)
        where
            T: Send + 'static,
            F: FnOnce(PathBuf) -> Result<T, orbit_core::AssetError> + Send + 'static,
        {
            if request.is_cancelled() {
                return;
            }
            let path = self.resolve(request.path());
            let ctx = self.ctx.clone();
            let spawned = std::thread::Builder::new()
                .name("orbit-loader".to_string())
                .spawn(move || {
                    tracing::debug!("Loading {}", path.display());
                    let result = load(path);
                    if request.complete(result)
                        && let Some(ctx) = ctx
                    {
                        ctx.request_repaint();
                    }
                });
            if let Err(e) = spawned {
                tracing::error!("Failed to spawn loader thread: {}", e);
            }
        }
    }

    impl AssetLoader for ThreadLoader {
        fn load_model(&self, request: LoadRequest<LoadedAsset>) {
            self.spawn(request, load_model);
        }

        fn load_environment(&self, request: LoadRequest<EnvironmentMap>) {
            self.spawn(request, EnvironmentMap::load);
        }
    }
}

#[cfg(target_arch = "wasm32")]
mod web {
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::JsFuture;

    use super::*;
    use orbit_core::AssetError;
    use orbit_core::asset::load_model_from_bytes;

    /// Fetches assets over HTTP relative to the page
    #[derive(Clone)]
    pub struct FetchLoader {
        ctx: Option<egui::Context>,
    }

    impl FetchLoader {
        pub fn new(ctx: Option<egui::Context>) -> Self {
            Self { ctx }
        }

        fn spawn<T, F>(&self, request: LoadRequest<T>, decode: F)
        where
            T: 'static,
            F: FnOnce(&str, &[u8]) -> Result<T, AssetError> + 'static,
        {
            if request.is_cancelled() {
                return;
            }
            let ctx = self.ctx.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let url = request.path().to_string();
                let result = match fetch_bytes(&url).await {
                    Ok(bytes) if request.is_cancelled() => {
                        tracing::debug!("Dropping {} bytes of cancelled '{}'", bytes.len(), url);
                        return;
                    }
                    Ok(bytes) => decode(&url, &bytes),
                    Err(e) => Err(e),
                };
                if request.complete(result)
                    && let Some(ctx) = ctx
                {
                    ctx.request_repaint();
                }
            });
        }
    }

    async fn fetch_bytes(url: &str) -> Result<Vec<u8>, AssetError> {
        let io = |e: wasm_bindgen::JsValue| AssetError::Io(format!("{url}: {e:?}"));

        let window = web_sys::window().ok_or_else(|| AssetError::Io("no window".to_string()))?;
        let response = JsFuture::from(window.fetch_with_str(url)).await.map_err(io)?;
        let response: web_sys::Response = response.dyn_into().map_err(io)?;
        if !response.ok() {
            return Err(AssetError::Io(format!(
                "{url}: HTTP {}",
                response.status()
            )));
        }
        let buffer = JsFuture::from(response.array_buffer().map_err(io)?)
            .await
            .map_err(io)?;
        Ok(js_sys::Uint8Array::new(&buffer).to_vec())
    }

    impl AssetLoader for FetchLoader {
        fn load_model(&self, request: LoadRequest<LoadedAsset>) {
            self.spawn(request, load_model_from_bytes);
        }

        fn load_environment(&self, request: LoadRequest<EnvironmentMap>) {
            self.spawn(request, EnvironmentMap::from_bytes);
        }
    }
}
