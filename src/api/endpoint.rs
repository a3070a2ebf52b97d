pub type Endpoint = str;

pub const LOGIN: &Endpoint = "/dn/userLogin";
pub const STATIONS: &Endpoint = "/dn/power/station/listApp";
pub const COLLECTORS: &Endpoint = "/dn/power/collector/listByApp";
pub const INVERTER_DATA: &Endpoint = "/dn/power/inverterData/inverterDatalist";
