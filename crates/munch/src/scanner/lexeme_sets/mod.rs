pub mod c_like;
