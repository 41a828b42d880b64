/// An edge between two data points, weighted by mutual reachability distance.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct MstEdge<T> {
    pub(crate) left_node_id: usize,
    pub(crate) right_node_id: usize,
    pub(crate) distance: T,
}
