mod human;

pub(crate) use human::HumanReadableOutput;
