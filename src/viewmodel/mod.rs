pub mod album_detail;
pub mod album_list;

pub use album_detail::AlbumDetailViewModel;
pub use album_list::AlbumListViewModel;
