// Event lists published by each NVIDIA PMU family

use cspmu_raw::arch::coresight::events::CYCLES_DEFAULT;

use super::EventAttr;
use crate::event_attrs;

/// Scalable Coherency Fabric
pub static SCF_EVENTS: &[EventAttr] = event_attrs![
    "bus_cycles" => 0x1d,

    "scf_cache_allocate" => 0xF0,
    "scf_cache_refill" => 0xF1,
    "scf_cache" => 0xF2,
    "scf_cache_wb" => 0xF3,

    socket4 "rd_data" => 0x101,
    socket4 "wb_data" => 0x109,

    socket4 "rd_outstanding" => 0x115,

    socket4 "rd_access" => 0x12d,
    socket4 "wb_access" => 0x135,
    socket4 "wr_access" => 0x139,

    "gmem_rd_data" => 0x16d,
    "gmem_rd_access" => 0x16e,
    "gmem_rd_outstanding" => 0x16f,
    "gmem_wb_data" => 0x173,
    "gmem_wb_access" => 0x174,
    "gmem_wr_data" => 0x179,
    "gmem_wr_access" => 0x17b,

    socket4 "wr_data" => 0x17c,

    "gmem_wr_total_bytes" => 0x1a0,
    "remote_socket_wr_total_bytes" => 0x1a1,
    "remote_socket_rd_data" => 0x1a2,
    "remote_socket_rd_outstanding" => 0x1a3,
    "remote_socket_rd_access" => 0x1a4,

    "cmem_rd_data" => 0x1a5,
    "cmem_rd_access" => 0x1a6,
    "cmem_rd_outstanding" => 0x1a7,
    "cmem_wb_data" => 0x1ab,
    "cmem_wb_access" => 0x1ac,
    "cmem_wr_data" => 0x1b1,

    "cmem_wr_access" => 0x1ca,

    "cmem_wr_total_bytes" => 0x1db,

    "cycles" => CYCLES_DEFAULT,
];

/// Memory Control Fabric PMUs: PCIe, NVLink-C2C and CNVLink
pub static MCF_EVENTS: &[EventAttr] = event_attrs![
    "rd_bytes_loc" => 0x0,
    "rd_bytes_rem" => 0x1,
    "wr_bytes_loc" => 0x2,
    "wr_bytes_rem" => 0x3,
    "total_bytes_loc" => 0x4,
    "total_bytes_rem" => 0x5,
    "rd_req_loc" => 0x6,
    "rd_req_rem" => 0x7,
    "wr_req_loc" => 0x8,
    "wr_req_rem" => 0x9,
    "total_req_loc" => 0xa,
    "total_req_rem" => 0xb,
    "rd_cum_outs_loc" => 0xc,
    "rd_cum_outs_rem" => 0xd,
    "cycles" => CYCLES_DEFAULT,
];

/// Unknown NVIDIA products only get the architected cycle event
pub static GENERIC_EVENTS: &[EventAttr] = event_attrs![
    "cycles" => CYCLES_DEFAULT,
];
