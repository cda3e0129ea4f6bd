// THEORY:
// The `screen_dispatcher` turns result categories into screen changes. A physical
// e-paper panel is slow and visibly flashes on every refresh, so the dispatcher's
// job is mostly to *not* render: it remembers which category is on screen and
// only paints when a genuinely different category arrives.
//
// Key architectural principles:
// 1.  **Idempotence**: Re-applying the category already on screen is a no-op.
// 2.  **Sentinel**: `Nothing` means "no opinion" and never touches the panel.
// 3.  **Reserved tier**: `Unknown` has a handler that deliberately does nothing,
//     yet it still becomes the current category like any other change.
// 4.  **Neutral exit**: Whatever happens, the panel is left showing a `NoTarget`
//     picture, either through `shutdown` or, failing that, on drop.

use crate::core_modules::asset_pool::AssetPools;
use crate::core_modules::observation::ResultCategory;
use crate::core_modules::selector::{AssetSelector, RandomSelector};
use crate::error::{BoxError, PresenceError};
use tracing::{debug, error};

/// Paints one asset onto the physical display.
pub trait RenderSink<A> {
    fn render(&mut self, asset: &A) -> Result<(), BoxError>;
}

/// What the dispatcher believes is currently on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenState {
    current_category: ResultCategory,
}

impl Default for ScreenState {
    fn default() -> Self {
        Self {
            current_category: ResultCategory::NoTarget,
        }
    }
}

impl ScreenState {
    pub fn current_category(&self) -> ResultCategory {
        self.current_category
    }
}

/// Maps result categories onto asset pools and a render sink, suppressing redundant renders.
pub struct ScreenDispatcher<A, R: RenderSink<A>> {
    pools: AssetPools<A>,
    selector: Box<dyn AssetSelector>,
    sink: R,
    screen: ScreenState,
    shut_down: bool,
}

impl<A, R: RenderSink<A>> ScreenDispatcher<A, R> {
    /// Creates a dispatcher that picks assets uniformly at random.
    pub fn new(pools: AssetPools<A>, sink: R) -> Self {
        Self::with_selector(pools, sink, RandomSelector)
    }

    pub fn with_selector(pools: AssetPools<A>, sink: R, selector: impl AssetSelector + 'static) -> Self {
        debug!("Init screen dispatcher");
        Self {
            pools,
            selector: Box::new(selector),
            sink,
            screen: ScreenState::default(),
            shut_down: false,
        }
    }

    pub fn screen(&self) -> &ScreenState {
        &self.screen
    }

    pub fn sink(&self) -> &R {
        &self.sink
    }

    /// Moves the display to `category`. Returns whether the render sink was invoked.
    pub fn apply(&mut self, category: ResultCategory) -> Result<bool, PresenceError> {
        if category == self.screen.current_category || category == ResultCategory::Nothing {
            return Ok(false);
        }

        let rendered = match self.pools.pool_for(category) {
            Some(pool) => {
                let asset = pool.pick(self.selector.as_mut());
                self.sink.render(asset).map_err(PresenceError::Render)?;
                true
            }
            None => false,
        };
        self.screen.current_category = category;
        debug!(?category, rendered, "Screen changed");
        Ok(rendered)
    }

    /// Leaves the panel on a neutral picture. Consumes the dispatcher.
    pub fn shutdown(mut self) -> Result<(), PresenceError> {
        self.shut_down = true;
        self.render_neutral()
    }

    /// Drops the dispatcher without touching the panel.
    pub(crate) fn discard(mut self) {
        self.shut_down = true;
    }

    fn render_neutral(&mut self) -> Result<(), PresenceError> {
        debug!("Rendering neutral screen");
        let asset = self.pools.no_target.pick(self.selector.as_mut());
        self.sink.render(asset).map_err(PresenceError::Render)?;
        self.screen.current_category = ResultCategory::NoTarget;
        Ok(())
    }
}

impl<A, R: RenderSink<A>> Drop for ScreenDispatcher<A, R> {
    fn drop(&mut self) {
        if self.shut_down {
            return;
        }
        if let Err(e) = self.render_neutral() {
            error!(error = %e, "Neutral render on drop failed");
        }
    }
}
