pub mod snapshot_repository;
