pub mod watchlist_service;
