// SPDX-License-Identifier: GPL-3.0-only
//! Gigabyte display device specifications

pub mod m27q;
