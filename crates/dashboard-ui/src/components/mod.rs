pub mod header;
pub mod kpi_tiles;
