/// The rendering/layout side of a [`crate::ScrollContainer`].
///
/// The container never touches UI objects. It tells the host which item needs a widget, where a
/// widget should be laid out, and when a widget can be recycled. `Handle` is whatever the host
/// uses to address a widget (an entity id, a slab key, a node pointer...).
pub trait WidgetHost<T> {
    type Handle;

    /// Creates (or pulls from a recycle bin) a widget showing `item` at logical `index`.
    fn acquire_widget(&mut self, item: &T, index: usize) -> Self::Handle;

    /// Returns a widget to the recyclable state. Called exactly once per acquired handle.
    fn release_widget(&mut self, handle: Self::Handle);

    /// Moves a widget to its new slot. `offset` is `index * item_height`.
    fn set_widget_offset(&mut self, handle: &Self::Handle, index: usize, offset: f32);

    /// The scrollable range changed to `total_height`.
    fn set_content_extent(&mut self, total_height: f32);

    /// A committed result contained no items.
    fn on_empty_result(&mut self) {}

    /// A fetch failed. After a failed refresh the list has already been cleared.
    fn on_error(&mut self, reason: &str) {
        let _ = reason;
    }
}

impl<T, H: WidgetHost<T> + ?Sized> WidgetHost<T> for &mut H {
    type Handle = H::Handle;

    fn acquire_widget(&mut self, item: &T, index: usize) -> Self::Handle {
        (**self).acquire_widget(item, index)
    }

    fn release_widget(&mut self, handle: Self::Handle) {
        (**self).release_widget(handle)
    }

    fn set_widget_offset(&mut self, handle: &Self::Handle, index: usize, offset: f32) {
        (**self).set_widget_offset(handle, index, offset)
    }

    fn set_content_extent(&mut self, total_height: f32) {
        (**self).set_content_extent(total_height)
    }

    fn on_empty_result(&mut self) {
        (**self).on_empty_result()
    }

    fn on_error(&mut self, reason: &str) {
        (**self).on_error(reason)
    }
}
