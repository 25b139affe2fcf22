use basket_optimizer_sdk::OptimizationItem;

/// Items the shopper wants priced, unique by item code.
///
/// Built fresh from whichever screen started the comparison (cart, saved
/// list, category page) and handed to the request builder as-is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroceryList {
    items: Vec<OptimizationItem>,
}

impl GroceryList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `quantity` of `item_code`, merging with an existing line.
    ///
    /// Quantities are summed; the first known name wins. Zero quantities
    /// are ignored.
    pub fn add(&mut self, item_code: impl Into<String>, quantity: u32, item_name: Option<String>) {
        if quantity == 0 {
            return;
        }
        let item_code = item_code.into();

        match self.items.iter_mut().find(|i| i.item_code == item_code) {
            Some(existing) => {
                existing.quantity = existing.quantity.saturating_add(quantity);
                if existing.item_name.is_none() {
                    existing.item_name = item_name;
                }
            }
            None => self.items.push(OptimizationItem {
                item_code,
                quantity,
                item_name,
            }),
        }
    }

    /// Overwrite the quantity of a line; 0 removes it
    pub fn set_quantity(&mut self, item_code: &str, quantity: u32) {
        if quantity == 0 {
            self.remove(item_code);
        } else if let Some(item) = self.items.iter_mut().find(|i| i.item_code == item_code) {
            item.quantity = quantity;
        }
    }

    pub fn remove(&mut self, item_code: &str) -> Option<OptimizationItem> {
        let index = self.items.iter().position(|i| i.item_code == item_code)?;
        Some(self.items.remove(index))
    }

    pub fn get(&self, item_code: &str) -> Option<&OptimizationItem> {
        self.items.iter().find(|i| i.item_code == item_code)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[OptimizationItem] {
        &self.items
    }

    pub fn into_items(self) -> Vec<OptimizationItem> {
        self.items
    }
}

impl Extend<OptimizationItem> for GroceryList {
    fn extend<T: IntoIterator<Item = OptimizationItem>>(&mut self, iter: T) {
        for item in iter {
            self.add(item.item_code, item.quantity, item.item_name);
        }
    }
}

impl FromIterator<OptimizationItem> for GroceryList {
    fn from_iter<T: IntoIterator<Item = OptimizationItem>>(iter: T) -> Self {
        let mut list = GroceryList::new();
        list.extend(iter);
        list
    }
}
