/// A page that can be shown in a [`TabContainer`].
pub trait TabPage {
    fn title(&self) -> &str;

    /// Height the page needs to show all of its content.
    fn required_height(&self) -> usize;
}

/// Hook run with the newly selected page. Returning a height resizes the
/// container.
pub type TabChangedHook<P> = Box<dyn Fn(&P) -> Option<usize> + Send + Sync>;

/// Tabbed container of pages with one page selected at a time.
///
/// Without a hook the container keeps the height of its tallest page.
/// [`TabContainer::auto_resizing`] instead follows the selected page.
pub struct TabContainer<P> {
    pages: Vec<P>,
    selected: usize,
    height: usize,
    on_tab_changed: Option<TabChangedHook<P>>,
}

impl<P: TabPage> TabContainer<P> {
    pub fn new(pages: Vec<P>) -> Self {
        let height = pages.iter().map(P::required_height).max().unwrap_or(0);
        Self {
            pages,
            selected: 0,
            height,
            on_tab_changed: None,
        }
    }

    /// Container whose height always equals the selected page's required
    /// height.
    pub fn auto_resizing(pages: Vec<P>) -> Self
    where
        P: 'static,
    {
        let mut tabs = Self::new(pages);
        tabs.set_on_tab_changed(Box::new(|page: &P| Some(page.required_height())));
        tabs
    }

    /// Install the hook and run it for the current page.
    pub fn set_on_tab_changed(&mut self, hook: TabChangedHook<P>) {
        self.on_tab_changed = Some(hook);
        self.tab_changed();
    }

    pub fn pages(&self) -> &[P] {
        &self.pages
    }

    pub fn page(&self, index: usize) -> Option<&P> {
        self.pages.get(index)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_page(&self) -> Option<&P> {
        self.pages.get(self.selected)
    }

    /// Current displayed height.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Select the page at `index`. Returns `false` when out of range.
    pub fn select(&mut self, index: usize) -> bool {
        if index >= self.pages.len() {
            return false;
        }
        self.selected = index;
        self.tab_changed();
        true
    }

    /// Select the next page, wrapping around.
    pub fn select_next(&mut self) -> bool {
        if self.pages.is_empty() {
            return false;
        }
        self.select((self.selected + 1) % self.pages.len())
    }

    /// Select the previous page, wrapping around.
    pub fn select_previous(&mut self) -> bool {
        if self.pages.is_empty() {
            return false;
        }
        let len = self.pages.len();
        self.select((self.selected + len - 1) % len)
    }

    fn tab_changed(&mut self) {
        let (Some(hook), Some(page)) = (&self.on_tab_changed, self.pages.get(self.selected)) else {
            return;
        };
        if let Some(height) = hook(page) {
            debug!("tab `{}` selected, height {height}", page.title());
            self.height = height;
        }
    }
}
