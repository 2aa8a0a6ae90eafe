use alloc::boxed::Box;
use core::fmt;
use core::mem;
use core::num::NonZeroUsize;
use core::ptr::{self, NonNull};

extern crate alloc;

/// A node in the recency list.
///
/// Holds a value and pointers to the neighbouring nodes. Not meant to be
/// used directly by consumers of [`List`].
pub(crate) struct Node<T> {
    /// The value stored in this node. Uses MaybeUninit so the sentinel
    /// nodes can exist without a value.
    val: mem::MaybeUninit<T>,
    /// Pointer to the previous node in the list.
    prev: *mut Node<T>,
    /// Pointer to the next node in the list.
    next: *mut Node<T>,
}

impl<T> Node<T> {
    /// Creates a new node holding the given value.
    fn new(val: T) -> Self {
        Node {
            val: mem::MaybeUninit::new(val),
            prev: ptr::null_mut(),
            next: ptr::null_mut(),
        }
    }

    /// Creates a sentinel node without initializing the value.
    ///
    /// Sentinels serve as the head and tail markers of the list.
    fn new_sentinel() -> Self {
        Node {
            val: mem::MaybeUninit::uninit(),
            prev: ptr::null_mut(),
            next: ptr::null_mut(),
        }
    }

    /// Returns a shared reference to the stored value.
    ///
    /// # Safety
    ///
    /// The value must be initialized; must not be called on a sentinel.
    pub(crate) unsafe fn get_value(&self) -> &T {
        self.val.assume_init_ref()
    }

    /// Returns a mutable reference to the stored value.
    ///
    /// # Safety
    ///
    /// The value must be initialized; must not be called on a sentinel.
    pub(crate) unsafe fn get_value_mut(&mut self) -> &mut T {
        self.val.assume_init_mut()
    }

    /// Consumes a detached node and moves the stored value out.
    ///
    /// # Safety
    ///
    /// The value must be initialized and the node must no longer be
    /// linked into any list.
    pub(crate) unsafe fn into_value(self: Box<Self>) -> T {
        self.val.assume_init()
    }
}

/// A doubly linked list with fixed capacity and O(1) reordering.
///
/// The list keeps sentinel nodes at the head and tail so that attach and
/// detach never need to special-case the ends. The node closest to the
/// head is the most recently touched one; the node closest to the tail is
/// the first candidate for eviction.
///
/// Node handles returned by [`add`](List::add) stay valid until the node
/// is removed or the list is dropped, which is what lets the owning store
/// keep raw pointers in its key index.
pub(crate) struct List<T> {
    /// Maximum number of items the list can hold.
    cap: NonZeroUsize,
    /// Current number of items in the list.
    len: usize,
    /// Pointer to the head sentinel.
    head: *mut Node<T>,
    /// Pointer to the tail sentinel.
    tail: *mut Node<T>,
}

impl<T> List<T> {
    /// Creates a new list that holds at most `cap` items.
    pub(crate) fn new(cap: NonZeroUsize) -> List<T> {
        let head = Box::into_raw(Box::new(Node::new_sentinel()));
        let tail = Box::into_raw(Box::new(Node::new_sentinel()));

        let list = List {
            cap,
            len: 0,
            head,
            tail,
        };

        unsafe {
            // SAFETY: head and tail are freshly allocated valid pointers
            (*list.head).next = list.tail;
            (*list.tail).prev = list.head;
        }

        list
    }

    /// Returns the maximum number of items the list can hold.
    pub(crate) fn cap(&self) -> NonZeroUsize {
        self.cap
    }

    /// Returns the current number of items in the list.
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the list contains no items.
    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns true if the list is at capacity.
    #[allow(dead_code)]
    pub(crate) fn is_full(&self) -> bool {
        self.len == self.cap.get()
    }

    /// Detaches a node from its neighbours without deallocating it.
    ///
    /// # Safety
    ///
    /// `node` must be a valid non-sentinel node currently linked into
    /// this list.
    unsafe fn detach(&mut self, node: *mut Node<T>) {
        // SAFETY: a linked node has valid prev and next pointers
        unsafe {
            (*(*node).prev).next = (*node).next;
            (*(*node).next).prev = (*node).prev;
        }
    }

    /// Links a node in right after the head sentinel, making it the
    /// most-recent item.
    ///
    /// # Safety
    ///
    /// `node` must be a valid node that is not currently linked into any
    /// list.
    unsafe fn attach(&mut self, node: *mut Node<T>) {
        (*node).next = (*self.head).next;
        (*node).prev = self.head;
        (*self.head).next = node;
        (*(*node).next).prev = node;
    }

    /// Adds a value at the most-recent position.
    ///
    /// Returns a pointer to the new node, or `None` if the list is full.
    pub(crate) fn add(&mut self, v: T) -> Option<*mut Node<T>> {
        if self.len == self.cap.get() {
            return None;
        }
        // SAFETY: Box::into_raw always yields a non-null pointer
        let node = unsafe { NonNull::new_unchecked(Box::into_raw(Box::new(Node::new(v)))) };
        // SAFETY: the node is freshly allocated and not linked anywhere
        unsafe { self.attach(node.as_ptr()) };
        self.len += 1;
        Some(node.as_ptr())
    }

    /// Removes the least-recent item (the one next to the tail sentinel).
    ///
    /// Returns the detached node, or `None` if the list is empty.
    pub(crate) fn remove_last(&mut self) -> Option<Box<Node<T>>> {
        if self.is_empty() {
            return None;
        }
        // SAFETY: head and tail were initialized in `new` and the list is
        // non-empty, so at least one real node sits between them.
        let prev = unsafe { (*self.tail).prev };
        if prev == self.head {
            return None;
        }
        unsafe {
            self.detach(prev);
        }
        self.len -= 1;
        // SAFETY: prev was just detached and is owned by no list
        unsafe { Some(Box::from_raw(prev)) }
    }

    /// Detaches a specific node and returns it.
    ///
    /// # Safety
    ///
    /// `node` must be a valid pointer to a node that is part of this
    /// list (not null, not freed, not a sentinel).
    pub(crate) unsafe fn remove(&mut self, node: *mut Node<T>) -> Option<Box<Node<T>>> {
        if self.is_empty() || node.is_null() || node == self.head || node == self.tail {
            return None;
        }

        unsafe {
            self.detach(node);
            self.len -= 1;
            Some(Box::from_raw(node))
        }
    }

    /// Moves a node to the most-recent position.
    ///
    /// # Safety
    ///
    /// `node` must point to a valid node currently linked into this list.
    pub(crate) unsafe fn move_to_front(&mut self, node: *mut Node<T>) {
        if node.is_null() || node == self.head || node == self.tail {
            return;
        }

        // Already the most-recent item, nothing to do
        if (*self.head).next == node {
            return;
        }

        self.detach(node);
        self.attach(node);
    }

    /// Returns a reference to the least-recent value without detaching it.
    pub(crate) fn peek_last(&self) -> Option<&T> {
        if self.is_empty() {
            return None;
        }
        // SAFETY: the list is non-empty, so tail.prev is a real node
        let prev = unsafe { (*self.tail).prev };
        if prev == self.head {
            None
        } else {
            // SAFETY: prev is a non-sentinel node with an initialized value
            Some(unsafe { (*prev).get_value() })
        }
    }

    /// Clears the list, dropping all values.
    pub(crate) fn clear(&mut self) {
        while let Some(node) = self.remove_last() {
            // SAFETY: the node was just detached and holds an initialized value
            drop(unsafe { node.into_value() });
        }
    }
}

impl<T> Drop for List<T> {
    fn drop(&mut self) {
        self.clear();

        // Free the sentinel nodes.
        // SAFETY: head and tail were allocated in `new` and are only freed
        // here; the null check guards against double-free.
        unsafe {
            if !self.head.is_null() {
                let _ = Box::from_raw(self.head);
                self.head = ptr::null_mut();
            }
            if !self.tail.is_null() {
                let _ = Box::from_raw(self.tail);
                self.tail = ptr::null_mut();
            }
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for List<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("List")
            .field("capacity", &self.cap)
            .field("length", &self.len)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::String;

    #[test]
    fn test_new_and_cap() {
        let list = List::<u32>::new(NonZeroUsize::new(3).unwrap());
        assert_eq!(list.cap().get(), 3);
        assert_eq!(list.len(), 0);
        assert!(!list.head.is_null());
        assert!(!list.tail.is_null());
    }

    #[test]
    fn test_add_until_full() {
        let mut list = List::<u32>::new(NonZeroUsize::new(2).unwrap());
        let node1 = list.add(10).unwrap();
        let node2 = list.add(20).unwrap();
        assert_eq!(list.len(), 2);
        assert_ne!(node1, node2);
        assert!(list.is_full());
        assert!(list.add(30).is_none());
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_remove_last_order() {
        let mut list = List::<u32>::new(NonZeroUsize::new(3).unwrap());

        assert!(list.remove_last().is_none());

        list.add(10).unwrap();
        list.add(20).unwrap();
        list.add(30).unwrap();

        // add() attaches at the front, so 10 is the least-recent item
        let last = list.remove_last().unwrap();
        assert_eq!(unsafe { last.into_value() }, 10);
        assert_eq!(list.len(), 2);

        let last = list.remove_last().unwrap();
        assert_eq!(unsafe { last.into_value() }, 20);

        let last = list.remove_last().unwrap();
        assert_eq!(unsafe { last.into_value() }, 30);
        assert!(list.is_empty());
    }

    #[test]
    fn test_move_to_front() {
        let mut list = List::<u32>::new(NonZeroUsize::new(3).unwrap());

        let node1 = list.add(10).unwrap();
        list.add(20).unwrap();
        list.add(30).unwrap();

        // Promote the least-recent item; 20 becomes the eviction candidate
        unsafe {
            list.move_to_front(node1);
        }
        assert_eq!(list.len(), 3);

        let last = list.remove_last().unwrap();
        assert_eq!(unsafe { last.into_value() }, 20);
    }

    #[test]
    fn test_move_front_node_is_noop() {
        let mut list = List::<u32>::new(NonZeroUsize::new(2).unwrap());

        list.add(10).unwrap();
        let node2 = list.add(20).unwrap();

        unsafe {
            list.move_to_front(node2);
        }
        assert_eq!(list.len(), 2);
        assert_eq!(list.peek_last(), Some(&10));
    }

    #[test]
    fn test_remove_specific_node() {
        let mut list = List::<u32>::new(NonZeroUsize::new(3).unwrap());

        list.add(10).unwrap();
        let node2 = list.add(20).unwrap();
        list.add(30).unwrap();

        let removed = unsafe { list.remove(node2) }.unwrap();
        assert_eq!(unsafe { removed.into_value() }, 20);
        assert_eq!(list.len(), 2);

        // Remaining order is unchanged
        assert_eq!(list.peek_last(), Some(&10));
    }

    #[test]
    fn test_peek_last() {
        let mut list = List::<u32>::new(NonZeroUsize::new(2).unwrap());
        assert_eq!(list.peek_last(), None);

        list.add(10).unwrap();
        assert_eq!(list.peek_last(), Some(&10));

        list.add(20).unwrap();
        // Peek does not detach
        assert_eq!(list.peek_last(), Some(&10));
        assert_eq!(list.peek_last(), Some(&10));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_get_value_through_node() {
        let mut list = List::<String>::new(NonZeroUsize::new(2).unwrap());
        let node = list.add(String::from("test")).unwrap();

        unsafe {
            assert_eq!((*node).get_value(), "test");
            (*node).get_value_mut().push_str("_modified");
            assert_eq!((*node).get_value(), "test_modified");
        }
    }

    #[test]
    fn test_clear_and_reuse() {
        let mut list = List::<u32>::new(NonZeroUsize::new(3).unwrap());

        list.add(10).unwrap();
        list.add(20).unwrap();
        list.add(30).unwrap();
        assert_eq!(list.len(), 3);

        list.clear();
        assert_eq!(list.len(), 0);
        assert!(list.is_empty());

        list.add(40).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list.peek_last(), Some(&40));
    }

    #[test]
    fn test_drop_releases_values() {
        struct CountDrop<'a>(&'a core::cell::Cell<u32>);
        impl Drop for CountDrop<'_> {
            fn drop(&mut self) {
                self.0.set(self.0.get() + 1);
            }
        }

        let drops = core::cell::Cell::new(0);
        {
            let mut list = List::new(NonZeroUsize::new(3).unwrap());
            list.add(CountDrop(&drops)).unwrap();
            list.add(CountDrop(&drops)).unwrap();
        }
        assert_eq!(drops.get(), 2);
    }
}
